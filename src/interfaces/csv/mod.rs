pub mod payment_writer;
pub mod teacher_reader;
