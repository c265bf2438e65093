//! # Freeze Contract
//!
//! Block producers propose to freeze or unfreeze accounts, then vote. A
//! proposal enrolls every producer active when it was made; once more than
//! two thirds of them agree it executes and is removed.
//!
//! Execution records the new status of each account in the `freezes` table.

use contract_sdk::prelude::*;
use std::cmp::max;

/// Freeze op code.
pub const OP_FREEZE: i32 = 1;
/// Unfreeze op code.
pub const OP_UNFREEZE: i32 = 0;

/// An enrolled producer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Voter {
    /// Producer account.
    pub name: AccountName,
    /// Whether the producer has voted.
    pub have_voted: bool,
}

impl Encode for Voter {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put(&self.name).put(&self.have_voted);
    }
}

impl Decode for Voter {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            name: dec.take()?,
            have_voted: dec.take()?,
        })
    }
}

/// An open proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FreezeInfo {
    /// Proposal id.
    pub id: u32,
    /// [`OP_FREEZE`] or [`OP_UNFREEZE`].
    pub op: u32,
    /// Votes in favour so far.
    pub agree: u32,
    /// Target accounts.
    pub accounts: Vec<AccountName>,
    /// One memo per target account.
    pub memos: Vec<String>,
    /// Producers enrolled at proposal time.
    pub producers: Vec<Voter>,
}

impl Encode for FreezeInfo {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put(&self.id)
            .put(&self.op)
            .put(&self.agree)
            .put(&self.accounts)
            .put(&self.memos)
            .put(&self.producers);
    }
}

impl Decode for FreezeInfo {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: dec.take()?,
            op: dec.take()?,
            agree: dec.take()?,
            accounts: dec.take()?,
            memos: dec.take()?,
            producers: dec.take()?,
        })
    }
}

impl Record for FreezeInfo {
    const DESCRIPTOR: RecordDescriptor = RecordDescriptor::table("freezeinfo");
}

impl Keyed for FreezeInfo {
    type Key = u32;

    fn primary_key(&self) -> u32 {
        self.id
    }

    fn set_primary_key(&mut self, key: u32) {
        self.id = key;
    }
}

/// Next proposal id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdInfo {
    /// Id the next proposal receives.
    pub proposal_id: u32,
}

impl Encode for IdInfo {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put(&self.proposal_id);
    }
}

impl Decode for IdInfo {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            proposal_id: dec.take()?,
        })
    }
}

impl Record for IdInfo {
    const DESCRIPTOR: RecordDescriptor = RecordDescriptor::singleton("idinfo");
}

/// Freeze status applied by an executed proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FreezeStatus {
    /// Affected account.
    pub account: AccountName,
    /// Whether the account is frozen.
    pub frozen: bool,
    /// Memo attached by the proposal.
    pub memo: String,
}

impl Encode for FreezeStatus {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put(&self.account).put(&self.frozen).put(&self.memo);
    }
}

impl Decode for FreezeStatus {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            account: dec.take()?,
            frozen: dec.take()?,
            memo: dec.take()?,
        })
    }
}

impl Record for FreezeStatus {
    const DESCRIPTOR: RecordDescriptor = RecordDescriptor::table("freezestatus");
}

impl Keyed for FreezeStatus {
    type Key = AccountName;

    fn primary_key(&self) -> AccountName {
        self.account.clone()
    }

    fn set_primary_key(&mut self, key: AccountName) {
        self.account = key;
    }
}

/// Votes needed to pass, exclusive: a proposal executes once
/// `agree > quorum_limit(n)`. Fewer than three producers count as three.
#[must_use]
pub fn quorum_limit(producers: usize) -> usize {
    (max(producers, 3) / 3) * 2
}

/// Freeze contract state.
pub struct Freeze {
    proposals: Table<FreezeInfo>,
    next_id: Singleton<IdInfo>,
    statuses: Table<FreezeStatus>,
}

impl Freeze {
    /// Opens a proposal enrolling the current producers. Producers only.
    pub fn proposalfreeze(
        &self,
        rt: &Runtime<'_>,
        (accounts, op, memos): (Vec<AccountName>, i32, Vec<String>),
    ) -> ContractResult<()> {
        ensure(
            op == OP_FREEZE || op == OP_UNFREEZE,
            "op invalid freeze=1 or unfreeze=0",
        )?;
        ensure(!accounts.is_empty(), "no accounts in proposal")?;
        ensure(
            accounts.len() == memos.len(),
            "accounts and memos differ in length",
        )?;

        let caller = rt.contract_caller().clone();
        let producers = rt.block_producers()?;
        ensure(
            producers.contains(&caller),
            format!("caller is not producers, name: {caller}"),
        )?;

        let id = self.next_id.get_or_create(rt)?.proposal_id;
        ensure(!self.proposals.has(rt, &id), "proposal duplicated")?;
        self.proposals.insert(rt, |f| {
            f.id = id;
            f.op = op.unsigned_abs();
            f.accounts = accounts;
            f.memos = memos;
            f.producers = producers
                .into_iter()
                .map(|name| Voter {
                    name,
                    have_voted: false,
                })
                .collect();
        })?;
        self.next_id.update(rt, |i| i.proposal_id += 1)?;
        rt.print(&format!("freeze proposal {id} opened by {caller}"));
        Ok(())
    }

    /// Records the caller's vote and executes the proposal on quorum.
    pub fn vote(&self, rt: &Runtime<'_>, (id,): (u32,)) -> ContractResult<()> {
        let next = self.next_id.get_or_create(rt)?.proposal_id;
        ensure(id < next, "proposal id exceed")?;
        ensure(self.proposals.has(rt, &id), "id not exist")?;

        let caller = rt.contract_caller().clone();
        let proposal = self.proposals.get(rt, &id)?;
        let Some(slot) = proposal.producers.iter().position(|v| v.name == caller) else {
            return Err(ContractError::assertion(format!(
                "caller is not in producers when proposal, caller: {caller}"
            )));
        };
        ensure(
            !proposal.producers[slot].have_voted,
            format!("caller has voted, caller: {caller}"),
        )?;

        self.proposals.update(rt, &id, |f| {
            f.producers[slot].have_voted = true;
            f.agree += 1;
        })?;

        let proposal = self.proposals.get(rt, &id)?;
        let agree = usize::try_from(proposal.agree).unwrap_or(usize::MAX);
        if agree > quorum_limit(proposal.producers.len()) {
            self.execute(rt, &proposal)?;
            rt.print(&format!(
                "freeze proposal {id} has been executed, then remove it from contract storage."
            ));
            self.proposals.remove(rt, &id)?;
        }
        Ok(())
    }

    fn execute(&self, rt: &Runtime<'_>, proposal: &FreezeInfo) -> ContractResult<()> {
        let frozen = proposal.op == OP_FREEZE.unsigned_abs();
        for (account, memo) in proposal.accounts.iter().zip(&proposal.memos) {
            if self.statuses.has(rt, account) {
                self.statuses.update(rt, account, |s| {
                    s.frozen = frozen;
                    s.memo = memo.clone();
                })?;
            } else {
                self.statuses.insert(rt, |s| {
                    s.account = account.clone();
                    s.frozen = frozen;
                    s.memo = memo.clone();
                })?;
            }
        }
        Ok(())
    }
}

/// Builds the deployable freeze contract.
pub fn contract() -> ContractResult<Dispatcher<Freeze>> {
    let freeze = Freeze {
        proposals: Table::declare("freezetable"),
        next_id: Singleton::declare("proposalid")?,
        statuses: Table::declare("freezes"),
    };
    let tables = [
        freeze.proposals.descriptor(),
        freeze.next_id.descriptor(),
        freeze.statuses.descriptor(),
    ];

    let mut dispatcher = Dispatcher::new("freeze", freeze)
        .export("proposalfreeze", Freeze::proposalfreeze)?
        .export("vote", Freeze::vote)?;
    for table in tables {
        dispatcher = dispatcher.declare_table(table)?;
    }
    Ok(dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_limit() {
        assert_eq!(quorum_limit(0), 2);
        assert_eq!(quorum_limit(2), 2);
        assert_eq!(quorum_limit(4), 2);
        assert_eq!(quorum_limit(6), 4);
        assert_eq!(quorum_limit(21), 14);
    }
}
