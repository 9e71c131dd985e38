pub mod donation;
