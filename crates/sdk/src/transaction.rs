//! Programmable transaction model.
//!
//! A [`Transaction`] is an ordered list of inputs and commands. Commands
//! reference inputs and the results of earlier commands through
//! [`Argument`]s, mirroring Sui's programmable transaction blocks:
//!
//! ```text
//! inputs:   [0] Shared(coordinator, mutable)  [1] Pure(dwallet id)  ...
//! commands: [0] MoveCall 0x2::coin::zero<IKA>()              -> Result(0)
//!           [1] MoveCall pkg::coordinator::request_presign(Input(0), Input(1), ..., Result(0), GasCoin)
//!           [2] TransferObjects([Result(1)], Input(n))
//!           [3] MoveCall 0x2::coin::destroy_zero<IKA>(Result(0))
//! ```
//!
//! Owned object inputs are unresolved: they carry only the object id and the
//! ledger client fills in version and digest at submission. Pure inputs are
//! BCS bytes.

use std::fmt;

use ika_sdk_core::{ObjectId, SuiAddress};
use serde::Serialize;

use crate::SdkError;

// ---------------------------------------------------------------------------
// Arguments and inputs
// ---------------------------------------------------------------------------

/// A value usable as a command argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Argument {
    /// The transaction's gas coin.
    GasCoin,
    /// The input at this index.
    Input(u16),
    /// The result of the command at this index.
    Result(u16),
}

/// Reference to an object consumed or borrowed by the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectArg {
    /// An owned or immutable object, resolved by the ledger client.
    ImmOrOwned(ObjectId),
    /// A shared object.
    Shared {
        /// Object id.
        id: ObjectId,
        /// Version at which the object became shared.
        initial_shared_version: u64,
        /// Whether the transaction mutates it.
        mutable: bool,
    },
}

impl ObjectArg {
    /// The referenced object id.
    pub fn id(&self) -> ObjectId {
        match self {
            Self::ImmOrOwned(id) | Self::Shared { id, .. } => *id,
        }
    }
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CallArg {
    /// BCS-encoded primitive value.
    Pure(Vec<u8>),
    /// Object reference.
    Object(ObjectArg),
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// An entry-point invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveCall {
    /// Package address.
    pub package: ObjectId,
    /// Module name.
    pub module: String,
    /// Function name.
    pub function: String,
    /// Fully qualified type arguments, e.g. `0x…::ika::IKA`.
    pub type_arguments: Vec<String>,
    /// Call arguments in order.
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    /// Starts a call to `package::module::function` with no arguments.
    pub fn new(package: ObjectId, module: &str, function: &str) -> Self {
        Self {
            package,
            module: module.to_owned(),
            function: function.to_owned(),
            type_arguments: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// Sets the type arguments.
    pub fn with_type_arguments(mut self, type_arguments: Vec<String>) -> Self {
        self.type_arguments = type_arguments;
        self
    }

    /// Sets the call arguments.
    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Returns `true` if this calls `module::function` (any package).
    pub fn is(&self, module: &str, function: &str) -> bool {
        self.module == module && self.function == function
    }
}

impl fmt::Display for MoveCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)?;
        if !self.type_arguments.is_empty() {
            write!(f, "<{}>", self.type_arguments.join(", "))?;
        }
        Ok(())
    }
}

/// A transaction command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Command {
    /// Invoke an entry point.
    MoveCall(Box<MoveCall>),
    /// Transfer the objects to the address held by the second argument.
    TransferObjects(Vec<Argument>, Argument),
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An unsigned programmable transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    sender: SuiAddress,
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
}

impl Transaction {
    /// Creates an empty transaction sent (and paid for) by `sender`.
    pub fn new(sender: SuiAddress) -> Self {
        Self {
            sender,
            inputs: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// The sender address.
    pub fn sender(&self) -> SuiAddress {
        self.sender
    }

    /// Inputs in order.
    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    /// Commands in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Looks up the input behind an `Argument::Input`.
    pub fn input(&self, arg: Argument) -> Option<&CallArg> {
        match arg {
            Argument::Input(i) => self.inputs.get(i as usize),
            _ => None,
        }
    }

    /// All move calls, in command order.
    pub fn move_calls(&self) -> impl Iterator<Item = &MoveCall> {
        self.commands.iter().filter_map(|c| match c {
            Command::MoveCall(call) => Some(call.as_ref()),
            Command::TransferObjects(..) => None,
        })
    }

    /// The gas coin.
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    /// Adds an owned object input. Repeated ids reuse the same input.
    pub fn object(&mut self, id: ObjectId) -> Argument {
        let existing = self.inputs.iter().position(|input| {
            matches!(input, CallArg::Object(ObjectArg::ImmOrOwned(existing)) if *existing == id)
        });
        match existing {
            Some(index) => Argument::Input(index as u16),
            None => self.push_input(CallArg::Object(ObjectArg::ImmOrOwned(id))),
        }
    }

    /// Adds a shared object input. Repeated ids reuse the same input; a
    /// mutable reference upgrades an earlier immutable one.
    pub fn shared_object(
        &mut self,
        id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    ) -> Argument {
        for (index, input) in self.inputs.iter_mut().enumerate() {
            if let CallArg::Object(ObjectArg::Shared {
                id: existing,
                mutable: existing_mutable,
                ..
            }) = input
            {
                if *existing == id {
                    *existing_mutable |= mutable;
                    return Argument::Input(index as u16);
                }
            }
        }
        self.push_input(CallArg::Object(ObjectArg::Shared {
            id,
            initial_shared_version,
            mutable,
        }))
    }

    /// Adds a BCS-encoded pure input.
    pub fn pure<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<Argument, SdkError> {
        let bytes = bcs::to_bytes(value).map_err(|e| SdkError::Serialization(e.to_string()))?;
        Ok(self.push_input(CallArg::Pure(bytes)))
    }

    /// Adds an object id as a pure `ID` input.
    pub fn pure_id(&mut self, id: &ObjectId) -> Argument {
        self.push_input(CallArg::Pure(id.as_bytes().to_vec()))
    }

    /// Adds a pure `u32` input.
    pub fn pure_u32(&mut self, value: u32) -> Argument {
        self.push_input(CallArg::Pure(value.to_le_bytes().to_vec()))
    }

    /// Adds a pure `address` input.
    pub fn pure_address(&mut self, address: &SuiAddress) -> Argument {
        self.push_input(CallArg::Pure(address.as_bytes().to_vec()))
    }

    /// Adds a pure `vector<u8>` input.
    pub fn pure_bytes(&mut self, bytes: &[u8]) -> Result<Argument, SdkError> {
        self.pure(bytes)
    }

    /// Appends a move call and returns its result.
    pub fn move_call(&mut self, call: MoveCall) -> Argument {
        let index = self.commands.len() as u16;
        self.commands.push(Command::MoveCall(Box::new(call)));
        Argument::Result(index)
    }

    /// Transfers `objects` to `recipient`.
    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: SuiAddress) {
        let recipient = self.pure_address(&recipient);
        self.commands
            .push(Command::TransferObjects(objects, recipient));
    }

    /// BCS encoding of this transaction model, as handed to the [`Signer`].
    ///
    /// This is not Sui `TransactionData`. A [`LedgerClient`] talking to a
    /// real node is expected to re-encode the transaction into the node's
    /// wire format.
    ///
    /// [`Signer`]: crate::ledger::Signer
    /// [`LedgerClient`]: crate::ledger::LedgerClient
    pub fn to_bytes(&self) -> Result<Vec<u8>, SdkError> {
        bcs::to_bytes(self).map_err(|e| SdkError::Serialization(e.to_string()))
    }

    fn push_input(&mut self, input: CallArg) -> Argument {
        let index = self.inputs.len() as u16;
        self.inputs.push(input);
        Argument::Input(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ObjectId {
        ObjectId::from_hex(s).unwrap()
    }

    #[test]
    fn owned_inputs_are_deduplicated() {
        let mut tx = Transaction::new(SuiAddress::ZERO);
        let a = tx.object(id("0xa"));
        let b = tx.object(id("0xb"));
        let a_again = tx.object(id("0xa"));
        assert_eq!(a, Argument::Input(0));
        assert_eq!(b, Argument::Input(1));
        assert_eq!(a_again, a);
        assert_eq!(tx.inputs().len(), 2);
    }

    #[test]
    fn shared_input_upgrades_to_mutable() {
        let mut tx = Transaction::new(SuiAddress::ZERO);
        let first = tx.shared_object(id("0xc"), 7, false);
        let second = tx.shared_object(id("0xc"), 7, true);
        assert_eq!(first, second);
        assert_eq!(
            tx.input(first),
            Some(&CallArg::Object(ObjectArg::Shared {
                id: id("0xc"),
                initial_shared_version: 7,
                mutable: true,
            }))
        );
    }

    #[test]
    fn pure_encodings() {
        let mut tx = Transaction::new(SuiAddress::ZERO);
        let n = tx.pure_u32(0);
        let bytes = tx.pure_bytes(&[1, 2, 3]).unwrap();
        let object = tx.pure_id(&id("0x2"));

        assert_eq!(tx.input(n), Some(&CallArg::Pure(vec![0, 0, 0, 0])));
        // ULEB128 length prefix followed by the bytes.
        assert_eq!(tx.input(bytes), Some(&CallArg::Pure(vec![3, 1, 2, 3])));
        match tx.input(object) {
            Some(CallArg::Pure(raw)) => {
                assert_eq!(raw.len(), 32);
                assert_eq!(raw[31], 2);
            }
            other => panic!("unexpected input: {other:?}"),
        }
    }

    #[test]
    fn move_call_results_index_commands() {
        let mut tx = Transaction::new(SuiAddress::ZERO);
        let first = tx.move_call(MoveCall::new(id("0x2"), "coin", "zero"));
        tx.transfer_objects(vec![first], SuiAddress::ZERO);
        let third = tx.move_call(MoveCall::new(id("0x2"), "coin", "destroy_zero"));
        assert_eq!(first, Argument::Result(0));
        assert_eq!(third, Argument::Result(2));
        assert_eq!(tx.move_calls().count(), 2);
    }

    #[test]
    fn move_call_display() {
        let call = MoveCall::new(id("0x2"), "coin", "zero")
            .with_type_arguments(vec!["0x1::ika::IKA".into()]);
        assert_eq!(
            call.to_string(),
            format!("{}::coin::zero<0x1::ika::IKA>", id("0x2"))
        );
        assert!(call.is("coin", "zero"));
        assert!(!call.is("coin", "destroy_zero"));
    }

    #[test]
    fn bcs_bytes_are_deterministic() {
        let build = || {
            let mut tx = Transaction::new(SuiAddress::ZERO);
            let coin = tx.object(id("0xf1"));
            tx.transfer_objects(vec![coin], SuiAddress::ZERO);
            tx
        };
        assert_eq!(build().to_bytes().unwrap(), build().to_bytes().unwrap());
        assert!(!build().to_bytes().unwrap().is_empty());
    }

    #[test]
    fn bytes_encode_the_model_not_node_transaction_data() {
        // Sender, then empty input and command vectors. No version tag.
        let bytes = Transaction::new(SuiAddress::new([7; 32])).to_bytes().unwrap();
        let mut expected = vec![7u8; 32];
        expected.extend([0, 0]);
        assert_eq!(bytes, expected);
    }
}
