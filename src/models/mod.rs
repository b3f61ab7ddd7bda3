pub mod product;
pub mod rfq;
pub mod token;
