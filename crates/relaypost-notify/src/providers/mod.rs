pub mod push;
pub mod sms;
pub mod smtp;
pub mod whatsapp;
