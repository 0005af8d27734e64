//! Request and response bodies

pub mod fundo;
pub mod relatorio;
