//! Report DTOs

use serde::{Deserialize, Serialize};

use core_kernel::RelatorioId;
use domain_fundo::{Relatorio, RelatorioFilter};

#[derive(Debug, Default, Deserialize)]
pub struct RelatorioQuery {
    pub nome: Option<String>,
}

impl From<RelatorioQuery> for RelatorioFilter {
    fn from(query: RelatorioQuery) -> Self {
        RelatorioFilter { nome: query.nome }
    }
}

#[derive(Debug, Serialize)]
pub struct RelatorioResponse {
    pub id: RelatorioId,
    pub nome: String,
    pub descricao: Option<String>,
    pub ativo: bool,
}

impl From<Relatorio> for RelatorioResponse {
    fn from(relatorio: Relatorio) -> Self {
        Self {
            id: relatorio.id,
            nome: relatorio.nome,
            descricao: relatorio.descricao,
            ativo: relatorio.ativo,
        }
    }
}
