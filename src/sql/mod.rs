pub mod normalizer;
pub mod validator;
