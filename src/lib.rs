pub mod quoting;
