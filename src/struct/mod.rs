pub mod alias;
pub mod book;
pub mod participant;
pub mod question;
pub mod request;
pub mod respond;
pub mod submit;
