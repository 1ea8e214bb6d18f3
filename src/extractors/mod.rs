pub mod docs;
pub mod ofac;
pub mod un;
