//! Request handlers

pub mod fundo;
pub mod health;
pub mod relatorio;
