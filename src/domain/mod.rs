//! Domain types: teachers, payment records, payment instruments and the
//! payment wizard, plus the ports the application layer depends on.

pub mod instrument;
pub mod notice;
pub mod payment;
pub mod ports;
pub mod seed;
pub mod teacher;
pub mod wizard;
