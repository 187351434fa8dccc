pub mod credit;
pub mod customer;
