//! Integration tests exercising the crates together.

mod helpers;

mod envelope_test;
mod mail_test;
mod upload_test;
