pub mod field;
pub mod mandelbox;
