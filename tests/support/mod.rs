pub mod visigov_env;
