//! # ABI Dispatcher
//!
//! Routes an invocation to a registered handler.
//!
//! A contract is its state (tables, singletons, constants) plus an ordered
//! list of exported methods. On every invocation the dispatcher:
//!
//! 1. builds the [`Runtime`] from host reads,
//! 2. rejects methods outside the export list before any handler code runs,
//! 3. reads the parameter blob (length query, then buffer read),
//! 4. decodes it against the handler's declared parameter tuple,
//! 5. calls the handler.

use crate::domain::codec::Params;
use crate::domain::schema::TableDescriptor;
use crate::errors::{ContractError, ContractResult};
use crate::ports::inbound::ContractEntry;
use crate::ports::outbound::HostAbi;
use crate::runtime::Runtime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

type Handler<C> = Box<dyn Fn(&C, &Runtime<'_>, &[u8]) -> ContractResult<()> + Send + Sync>;

struct Export<C> {
    name: String,
    params: Vec<String>,
    handler: Handler<C>,
}

/// Published description of a contract's methods and tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAbi {
    /// Contract code name.
    pub contract: String,
    /// Exported methods in declaration order.
    pub methods: Vec<MethodAbi>,
    /// Declared tables and singleton slots.
    pub tables: Vec<TableDescriptor>,
}

/// One exported method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodAbi {
    /// Method name.
    pub name: String,
    /// Codec type names of the parameters, in order.
    pub params: Vec<String>,
}

impl ContractAbi {
    /// Pretty-printed JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A contract: state plus its exported handlers.
pub struct Dispatcher<C> {
    contract: String,
    state: C,
    exports: Vec<Export<C>>,
    tables: Vec<TableDescriptor>,
}

impl<C> fmt::Debug for Dispatcher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("contract", &self.contract)
            .field("exports", &self.export_names())
            .field("tables", &self.tables)
            .finish_non_exhaustive()
    }
}

impl<C: Send + Sync + 'static> Dispatcher<C> {
    /// Starts a contract with no exports.
    pub fn new(contract: impl Into<String>, state: C) -> Self {
        Self {
            contract: contract.into(),
            state,
            exports: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Exports `handler` as `name`. Its parameter tuple `P` is the
    /// method's declared signature.
    ///
    /// A repeated name is [`ContractError::InvalidDeclaration`].
    pub fn export<P, F>(mut self, name: impl Into<String>, handler: F) -> ContractResult<Self>
    where
        P: Params + 'static,
        F: Fn(&C, &Runtime<'_>, P) -> ContractResult<()> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.exports.iter().any(|e| e.name == name) {
            return Err(ContractError::InvalidDeclaration(format!(
                "method {name} exported twice by {}",
                self.contract
            )));
        }
        let handler: Handler<C> = Box::new(move |state, rt, params| {
            let args = P::decode(params)?;
            handler(state, rt, args)
        });
        self.exports.push(Export {
            name,
            params: P::param_types(),
            handler,
        });
        Ok(self)
    }

    /// Publishes a table in the ABI. A repeated name is
    /// [`ContractError::InvalidDeclaration`].
    pub fn declare_table(mut self, descriptor: TableDescriptor) -> ContractResult<Self> {
        if self.tables.iter().any(|t| t.name == descriptor.name) {
            return Err(ContractError::InvalidDeclaration(format!(
                "table {} declared twice by {}",
                descriptor.name, self.contract
            )));
        }
        self.tables.push(descriptor);
        Ok(self)
    }

    /// Contract code name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.contract
    }

    /// Contract state.
    #[must_use]
    pub fn state(&self) -> &C {
        &self.state
    }

    /// Published ABI.
    #[must_use]
    pub fn abi(&self) -> ContractAbi {
        ContractAbi {
            contract: self.contract.clone(),
            methods: self
                .exports
                .iter()
                .map(|e| MethodAbi {
                    name: e.name.clone(),
                    params: e.params.clone(),
                })
                .collect(),
            tables: self.tables.clone(),
        }
    }

    fn dispatch(&self, host: &dyn HostAbi) -> ContractResult<()> {
        let rt = Runtime::attach(host)?;
        let method = rt.contract_method();
        let Some(export) = self.exports.iter().find(|e| e.name == method) else {
            return Err(ContractError::UnknownMethod {
                contract: rt.contract_name().to_string(),
                method: method.to_string(),
            });
        };

        let params = read_params(host)?;
        debug!(
            contract = %rt.contract_name(),
            method,
            params = params.len(),
            depth = rt.context().depth(),
            "dispatch"
        );
        (export.handler)(&self.state, &rt, &params)
    }
}

impl<C> Dispatcher<C> {
    fn export_names(&self) -> Vec<String> {
        self.exports.iter().map(|e| e.name.clone()).collect()
    }
}

impl<C: Send + Sync + 'static> ContractEntry for Dispatcher<C> {
    fn apply(&self, host: &dyn HostAbi) -> Result<(), ContractError> {
        self.dispatch(host)
    }

    fn exports(&self) -> Vec<String> {
        self.export_names()
    }
}

fn read_params(host: &dyn HostAbi) -> ContractResult<Vec<u8>> {
    let len = host.read_contract_params_length();
    let mut params = vec![0u8; len];
    if len > 0 {
        let written = host.read_contract_params(&mut params);
        if written != len {
            return Err(ContractError::HostFault(format!(
                "parameter read returned {written} of {len} bytes"
            )));
        }
    }
    Ok(params)
}

// =============================================================================
// TESTS
// =============================================================================
