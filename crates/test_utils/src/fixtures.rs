//! Pre-built Test Fixtures
//!
//! Ready-to-use test data. Every CNPJ below passes the checksum.

use domain_fundo::{NewFundo, NewRelatorio};

/// Fixture for CNPJ test data
pub struct CnpjFixtures;

impl CnpjFixtures {
    /// Valid masked CNPJs, distinct from each other
    pub const VALID: [&'static str; 10] = [
        "11.222.333/0001-81",
        "12.345.678/0001-95",
        "00.000.000/0001-91",
        "60.901.234/0001-31",
        "19.376.345/0001-72",
        "98.765.432/0001-98",
        "45.612.378/0001-84",
        "33.100.111/0001-29",
        "55.044.322/0001-24",
        "72.451.098/0001-04",
    ];

    /// The first valid CNPJ
    pub fn primary() -> &'static str {
        Self::VALID[0]
    }

    /// A second valid CNPJ, used as the master fund reference
    pub fn master() -> &'static str {
        Self::VALID[1]
    }

    /// A well-formed CNPJ whose last check digit is wrong
    pub fn bad_checksum() -> &'static str {
        "11.222.333/0001-82"
    }

    /// The digits of [`CnpjFixtures::primary`] without the mask
    pub fn unformatted() -> &'static str {
        "11222333000181"
    }
}

/// Fixture for fund test data
pub struct FundoFixtures;

impl FundoFixtures {
    /// A fixed-income fund without master or observation
    pub fn renda_fixa() -> NewFundo {
        NewFundo::new(CnpjFixtures::primary(), "Renda Fixa", "Crédito Privado")
    }

    /// A multimarket feeder fund pointing at a master fund
    pub fn feeder() -> NewFundo {
        NewFundo::new(CnpjFixtures::VALID[3], "Multimercado", "Macro")
            .with_obs("Fundo espelho")
            .with_master(Some(4321), Some(CnpjFixtures::master().to_string()))
    }

    /// An equity fund
    pub fn acoes() -> NewFundo {
        NewFundo::new(CnpjFixtures::VALID[4], "Ações", "Long Only")
    }
}

/// Fixture for report test data
pub struct RelatorioFixtures;

impl RelatorioFixtures {
    /// The reports shipped in the default import configuration
    pub fn defaults() -> Vec<NewRelatorio> {
        vec![
            NewRelatorio::new("RV Int'l USD").with_descricao("Relatório de Renda Variável Internacional USD"),
            NewRelatorio::new("MM Int'l").with_descricao("Relatório de Multimercados Internacional"),
            NewRelatorio::new("Multimercados").with_descricao("Relatório de Multimercados"),
        ]
    }
}
