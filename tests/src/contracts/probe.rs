//! # Probe Contract
//!
//! Asserts what the host reports about the current invocation, and forwards
//! calls so the same checks run one or more levels deep.

use contract_sdk::prelude::*;

/// A marker written by `mark`, keyed by label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mark {
    /// Marker label.
    pub label: String,
    /// Depth the marker was written at.
    pub depth: u32,
}

impl Encode for Mark {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put(&self.label).put(&self.depth);
    }
}

impl Decode for Mark {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            label: dec.take()?,
            depth: dec.take()?,
        })
    }
}

impl Record for Mark {
    const DESCRIPTOR: RecordDescriptor = RecordDescriptor::table("mark");
}

impl Keyed for Mark {
    type Key = String;

    fn primary_key(&self) -> String {
        self.label.clone()
    }

    fn set_primary_key(&mut self, key: String) {
        self.label = key;
    }
}

/// Probe state.
pub struct Probe {
    marks: Table<Mark>,
}

/// Parameters of a forwarded call: target owner and name, method, coins and
/// the already encoded parameter tuple.
pub type ForwardArgs = (AccountName, String, String, u64, Vec<u8>);

impl Probe {
    fn called_by_user(&self, rt: &Runtime<'_>, (expected,): (bool,)) -> ContractResult<()> {
        ensure(
            rt.contract_called_by_user() == expected,
            "is_contract_called_by_user",
        )
    }

    fn caller(&self, rt: &Runtime<'_>, (expected,): (AccountName,)) -> ContractResult<()> {
        ensure(*rt.contract_caller() == expected, "get_contract_caller")
    }

    fn caller_contract(
        &self,
        rt: &Runtime<'_>,
        (owner, name): (AccountName, String),
    ) -> ContractResult<()> {
        let matches = match rt.contract_caller_contract() {
            Some(c) => c.owner == owner && c.name == name,
            None => owner.is_empty() && name.is_empty(),
        };
        ensure(matches, "get_contract_caller_contract")
    }

    fn depth(&self, rt: &Runtime<'_>, (expected,): (u32,)) -> ContractResult<()> {
        ensure(rt.context().depth() == expected, "get_contract_depth")
    }

    fn sender_value(&self, rt: &Runtime<'_>, (expected,): (u64,)) -> ContractResult<()> {
        ensure(rt.sender_value() == expected, "get_contract_sender_value")
    }

    fn require_auth(&self, rt: &Runtime<'_>, (account,): (AccountName,)) -> ContractResult<()> {
        rt.require_auth(&account)
    }

    fn require_auth_contract(
        &self,
        rt: &Runtime<'_>,
        (owner, name): (AccountName, String),
    ) -> ContractResult<()> {
        rt.require_contract_auth(&ContractName::new(owner, name))
    }

    fn transfer_to_user(
        &self,
        rt: &Runtime<'_>,
        (to, amount): (AccountName, u64),
    ) -> ContractResult<()> {
        rt.transfer_to_user(&to, amount, "probe payout")
    }

    fn mark(&self, rt: &Runtime<'_>, (label,): (String,)) -> ContractResult<()> {
        let depth = rt.context().depth();
        self.marks.insert(rt, |m| {
            m.label = label;
            m.depth = depth;
        })?;
        Ok(())
    }

    fn fail(&self, _rt: &Runtime<'_>, (reason,): (String,)) -> ContractResult<()> {
        Err(ContractError::assertion(reason))
    }

    fn forward(
        &self,
        rt: &Runtime<'_>,
        (owner, name, method, value, params): ForwardArgs,
    ) -> ContractResult<()> {
        rt.execute(&CallRequest {
            target: ContractName::new(owner, name),
            method,
            value,
            params,
        })
    }

    /// Forwards, then fails after the callee succeeded.
    fn forward_then_fail(&self, rt: &Runtime<'_>, args: ForwardArgs) -> ContractResult<()> {
        self.forward(rt, args)?;
        Err(ContractError::assertion("failed after forwarding"))
    }

    /// Marks, forwards, and returns `Ok` whatever the callee did.
    fn forward_ignoring_failure(&self, rt: &Runtime<'_>, args: ForwardArgs) -> ContractResult<()> {
        self.mark(rt, ("before".to_string(),))?;
        if let Err(err) = self.forward(rt, args) {
            rt.print(&format!("callee failed: {err}"));
        }
        Ok(())
    }

    /// Marks the current depth, then calls itself again.
    fn recurse(&self, rt: &Runtime<'_>, (): ()) -> ContractResult<()> {
        let label = format!("depth-{}", rt.context().depth());
        self.mark(rt, (label,))?;
        rt.call(rt.contract_name(), "recurse", 0, &())
    }
}

/// Builds the deployable probe contract.
pub fn contract() -> ContractResult<Dispatcher<Probe>> {
    let probe = Probe {
        marks: Table::declare("marks"),
    };
    let marks = probe.marks.descriptor();

    Dispatcher::new("probe", probe)
        .export("is_contract_called_by_user", Probe::called_by_user)?
        .export("get_contract_caller", Probe::caller)?
        .export("get_contract_caller_contract", Probe::caller_contract)?
        .export("get_contract_depth", Probe::depth)?
        .export("get_contract_sender_value", Probe::sender_value)?
        .export("require_auth", Probe::require_auth)?
        .export("require_auth_contract", Probe::require_auth_contract)?
        .export("transfer_to_user", Probe::transfer_to_user)?
        .export("mark", Probe::mark)?
        .export("fail", Probe::fail)?
        .export("forward", Probe::forward)?
        .export("forward_then_fail", Probe::forward_then_fail)?
        .export("forward_ignoring_failure", Probe::forward_ignoring_failure)?
        .export("recurse", Probe::recurse)?
        .declare_table(marks)
}
