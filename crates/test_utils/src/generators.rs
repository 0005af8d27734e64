//! Property-Based Test Generators
//!
//! Provides proptest strategies that generate CNPJs and fund attributes
//! satisfying the domain invariants.

use proptest::prelude::*;

use core_kernel::complete_cnpj;
use domain_fundo::NewFundo;

/// Strategy for twelve-digit CNPJ bases that are not one repeated digit
pub fn cnpj_base_strategy() -> impl Strategy<Value = String> {
    "[0-9]{12}".prop_filter("repeated digits", |base| {
        let first = base.as_bytes()[0];
        !base.bytes().all(|b| b == first)
    })
}

/// Strategy for valid masked CNPJs
pub fn valid_cnpj_strategy() -> impl Strategy<Value = String> {
    cnpj_base_strategy().prop_filter_map("not a valid CNPJ", |base| {
        complete_cnpj(&base).filter(|cnpj| core_kernel::is_valid_cnpj(cnpj))
    })
}

/// Strategy for non-blank short text such as a class or strategy
pub fn label_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,30}"
}

/// Strategy for fund attributes that pass validation
pub fn new_fundo_strategy() -> impl Strategy<Value = NewFundo> {
    (
        valid_cnpj_strategy(),
        label_strategy(),
        label_strategy(),
        proptest::option::of("[a-z ]{0,40}"),
        proptest::option::of((any::<i32>(), valid_cnpj_strategy())),
    )
        .prop_map(|(cnpj, classe, estrategia, obs, master)| {
            let mut fundo = NewFundo::new(cnpj, classe, estrategia);
            fundo.st_obs_fundo = obs;
            if let Some((cod, master_cnpj)) = master {
                fundo = fundo.with_master(Some(cod), Some(master_cnpj));
            }
            fundo
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_generated_cnpjs_are_valid(cnpj in valid_cnpj_strategy()) {
            prop_assert!(core_kernel::is_formatted_cnpj(&cnpj));
            prop_assert!(core_kernel::is_valid_cnpj(&cnpj));
        }

        #[test]
        fn prop_generated_funds_validate(fundo in new_fundo_strategy()) {
            prop_assert!(fundo.validate().is_ok());
        }
    }
}
