pub mod turnorder;
