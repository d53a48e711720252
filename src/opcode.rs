//! This module contains the [`Mnemonic`] type, a closed representation of the
//! EVM's [opcode](https://ethereum.org/en/developers/docs/evm/opcodes/) table,
//! together with the static gas-cost schedule used by the analyzer.
//!
//! # A Closed Opcode Vocabulary
//!
//! Rather than passing opcode names around as strings, every byte in the
//! instruction stream decodes to exactly one variant of [`Mnemonic`]. Bytes
//! with no assigned instruction decode to [`Mnemonic::Unknown`], which keeps
//! decoding total over arbitrary byte streams while still being impossible to
//! confuse with a real instruction.

use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

use crate::constant::{
    DUP_OPCODE_BASE_VALUE,
    LOG_OPCODE_BASE_VALUE,
    PUSH_OPCODE_BASE_VALUE,
    SWAP_OPCODE_BASE_VALUE,
};

/// A single decoded EVM instruction mnemonic.
///
/// The `PUSH`, `DUP`, `SWAP` and `LOG` families carry their `N` parameter
/// (`1..=32`, `1..=16`, `1..=16` and `0..=4` respectively) rather than being
/// expanded into one variant per family member.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mnemonic {
    Stop,
    Add,
    Mul,
    Sub,
    Div,
    SDiv,
    Mod,
    SMod,
    AddMod,
    MulMod,
    Exp,
    SignExtend,
    Lt,
    Gt,
    SLt,
    SGt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Not,
    Byte,
    Shl,
    Shr,
    Sar,
    Sha3,
    Address,
    Balance,
    Origin,
    Caller,
    CallValue,
    CallDataLoad,
    CallDataSize,
    CallDataCopy,
    CodeSize,
    CodeCopy,
    GasPrice,
    ExtCodeSize,
    ExtCodeCopy,
    ReturnDataSize,
    ReturnDataCopy,
    ExtCodeHash,
    BlockHash,
    CoinBase,
    Timestamp,
    Number,
    Prevrandao,
    GasLimit,
    ChainId,
    SelfBalance,
    BaseFee,
    Pop,
    MLoad,
    MStore,
    MStore8,
    SLoad,
    SStore,
    Jump,
    JumpI,
    PC,
    MSize,
    Gas,
    JumpDest,
    Push0,
    /// `PUSHN` for `N` in `1..=32`.
    Push(u8),
    /// `DUPN` for `N` in `1..=16`.
    Dup(u8),
    /// `SWAPN` for `N` in `1..=16`.
    Swap(u8),
    /// `LOGN` for `N` in `0..=4`.
    Log(u8),
    Create,
    Call,
    CallCode,
    Return,
    DelegateCall,
    Create2,
    StaticCall,
    Revert,
    Invalid,
    SelfDestruct,
    /// Any byte with no assigned instruction, commonly CBOR metadata at the
    /// end of deployed bytecode.
    Unknown(u8),
}

impl Mnemonic {
    /// Decodes the provided `byte` into its corresponding mnemonic.
    ///
    /// Decoding is total; bytes with no assigned instruction become
    /// [`Mnemonic::Unknown`].
    #[must_use]
    #[allow(clippy::too_many_lines)] // Splitting the table up brings no benefit
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Stop,
            0x01 => Self::Add,
            0x02 => Self::Mul,
            0x03 => Self::Sub,
            0x04 => Self::Div,
            0x05 => Self::SDiv,
            0x06 => Self::Mod,
            0x07 => Self::SMod,
            0x08 => Self::AddMod,
            0x09 => Self::MulMod,
            0x0a => Self::Exp,
            0x0b => Self::SignExtend,
            0x10 => Self::Lt,
            0x11 => Self::Gt,
            0x12 => Self::SLt,
            0x13 => Self::SGt,
            0x14 => Self::Eq,
            0x15 => Self::IsZero,
            0x16 => Self::And,
            0x17 => Self::Or,
            0x18 => Self::Xor,
            0x19 => Self::Not,
            0x1a => Self::Byte,
            0x1b => Self::Shl,
            0x1c => Self::Shr,
            0x1d => Self::Sar,
            0x20 => Self::Sha3,
            0x30 => Self::Address,
            0x31 => Self::Balance,
            0x32 => Self::Origin,
            0x33 => Self::Caller,
            0x34 => Self::CallValue,
            0x35 => Self::CallDataLoad,
            0x36 => Self::CallDataSize,
            0x37 => Self::CallDataCopy,
            0x38 => Self::CodeSize,
            0x39 => Self::CodeCopy,
            0x3a => Self::GasPrice,
            0x3b => Self::ExtCodeSize,
            0x3c => Self::ExtCodeCopy,
            0x3d => Self::ReturnDataSize,
            0x3e => Self::ReturnDataCopy,
            0x3f => Self::ExtCodeHash,
            0x40 => Self::BlockHash,
            0x41 => Self::CoinBase,
            0x42 => Self::Timestamp,
            0x43 => Self::Number,
            0x44 => Self::Prevrandao,
            0x45 => Self::GasLimit,
            0x46 => Self::ChainId,
            0x47 => Self::SelfBalance,
            0x48 => Self::BaseFee,
            0x50 => Self::Pop,
            0x51 => Self::MLoad,
            0x52 => Self::MStore,
            0x53 => Self::MStore8,
            0x54 => Self::SLoad,
            0x55 => Self::SStore,
            0x56 => Self::Jump,
            0x57 => Self::JumpI,
            0x58 => Self::PC,
            0x59 => Self::MSize,
            0x5a => Self::Gas,
            0x5b => Self::JumpDest,
            0x5f => Self::Push0,
            0x60..=0x7f => Self::Push(byte - PUSH_OPCODE_BASE_VALUE),
            0x80..=0x8f => Self::Dup(byte - DUP_OPCODE_BASE_VALUE),
            0x90..=0x9f => Self::Swap(byte - SWAP_OPCODE_BASE_VALUE),
            0xa0..=0xa4 => Self::Log(byte - LOG_OPCODE_BASE_VALUE),
            0xf0 => Self::Create,
            0xf1 => Self::Call,
            0xf2 => Self::CallCode,
            0xf3 => Self::Return,
            0xf4 => Self::DelegateCall,
            0xf5 => Self::Create2,
            0xfa => Self::StaticCall,
            0xfd => Self::Revert,
            0xfe => Self::Invalid,
            0xff => Self::SelfDestruct,
            _ => Self::Unknown(byte),
        }
    }

    /// Gets the byte representation of the mnemonic.
    #[must_use]
    #[allow(clippy::too_many_lines)] // Splitting the table up brings no benefit
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Stop => 0x00,
            Self::Add => 0x01,
            Self::Mul => 0x02,
            Self::Sub => 0x03,
            Self::Div => 0x04,
            Self::SDiv => 0x05,
            Self::Mod => 0x06,
            Self::SMod => 0x07,
            Self::AddMod => 0x08,
            Self::MulMod => 0x09,
            Self::Exp => 0x0a,
            Self::SignExtend => 0x0b,
            Self::Lt => 0x10,
            Self::Gt => 0x11,
            Self::SLt => 0x12,
            Self::SGt => 0x13,
            Self::Eq => 0x14,
            Self::IsZero => 0x15,
            Self::And => 0x16,
            Self::Or => 0x17,
            Self::Xor => 0x18,
            Self::Not => 0x19,
            Self::Byte => 0x1a,
            Self::Shl => 0x1b,
            Self::Shr => 0x1c,
            Self::Sar => 0x1d,
            Self::Sha3 => 0x20,
            Self::Address => 0x30,
            Self::Balance => 0x31,
            Self::Origin => 0x32,
            Self::Caller => 0x33,
            Self::CallValue => 0x34,
            Self::CallDataLoad => 0x35,
            Self::CallDataSize => 0x36,
            Self::CallDataCopy => 0x37,
            Self::CodeSize => 0x38,
            Self::CodeCopy => 0x39,
            Self::GasPrice => 0x3a,
            Self::ExtCodeSize => 0x3b,
            Self::ExtCodeCopy => 0x3c,
            Self::ReturnDataSize => 0x3d,
            Self::ReturnDataCopy => 0x3e,
            Self::ExtCodeHash => 0x3f,
            Self::BlockHash => 0x40,
            Self::CoinBase => 0x41,
            Self::Timestamp => 0x42,
            Self::Number => 0x43,
            Self::Prevrandao => 0x44,
            Self::GasLimit => 0x45,
            Self::ChainId => 0x46,
            Self::SelfBalance => 0x47,
            Self::BaseFee => 0x48,
            Self::Pop => 0x50,
            Self::MLoad => 0x51,
            Self::MStore => 0x52,
            Self::MStore8 => 0x53,
            Self::SLoad => 0x54,
            Self::SStore => 0x55,
            Self::Jump => 0x56,
            Self::JumpI => 0x57,
            Self::PC => 0x58,
            Self::MSize => 0x59,
            Self::Gas => 0x5a,
            Self::JumpDest => 0x5b,
            Self::Push0 => 0x5f,
            Self::Push(n) => PUSH_OPCODE_BASE_VALUE + n,
            Self::Dup(n) => DUP_OPCODE_BASE_VALUE + n,
            Self::Swap(n) => SWAP_OPCODE_BASE_VALUE + n,
            Self::Log(n) => LOG_OPCODE_BASE_VALUE + n,
            Self::Create => 0xf0,
            Self::Call => 0xf1,
            Self::CallCode => 0xf2,
            Self::Return => 0xf3,
            Self::DelegateCall => 0xf4,
            Self::Create2 => 0xf5,
            Self::StaticCall => 0xfa,
            Self::Revert => 0xfd,
            Self::Invalid => 0xfe,
            Self::SelfDestruct => 0xff,
            Self::Unknown(byte) => *byte,
        }
    }

    /// Gets the number of immediate data bytes that follow the instruction in
    /// the bytecode.
    ///
    /// This is non-zero only for the `PUSH` family, which inlines `1..=32`
    /// bytes of data directly after the instruction byte.
    #[must_use]
    pub fn immediate_size(&self) -> usize {
        match self {
            Self::Push(n) => *n as usize,
            _ => 0,
        }
    }

    /// Checks whether the mnemonic represents a byte with no assigned
    /// instruction.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Checks whether the mnemonic is a call to another contract.
    #[must_use]
    pub fn is_external_call(&self) -> bool {
        matches!(
            self,
            Self::Call | Self::CallCode | Self::DelegateCall | Self::StaticCall
        )
    }

    /// Gets the cost of the instruction in gas under the static schedule.
    ///
    /// # A Documented Approximation
    ///
    /// The static schedule deliberately uses flat per-opcode figures, with
    /// state-dependent instructions carrying their worst-common-case estimate
    /// behind [`GasCost::Dynamic`] (e.g. a flat 2100 for a cold `SLOAD`). It
    /// does not model warm/cold access sets or EIP-2929 refunds. Runtime
    /// trace data, where available, always supersedes these figures during
    /// analysis.
    #[must_use]
    #[allow(clippy::too_many_lines)] // Splitting the table up brings no benefit
    pub fn gas_cost(&self) -> GasCost {
        match self {
            Self::Stop | Self::Return | Self::Revert | Self::Invalid | Self::Unknown(_) => {
                GasCost::Fixed(0)
            }
            Self::JumpDest => GasCost::Fixed(1),
            Self::Address
            | Self::Origin
            | Self::Caller
            | Self::CallValue
            | Self::CallDataSize
            | Self::CodeSize
            | Self::GasPrice
            | Self::ReturnDataSize
            | Self::CoinBase
            | Self::Timestamp
            | Self::Number
            | Self::Prevrandao
            | Self::GasLimit
            | Self::ChainId
            | Self::BaseFee
            | Self::Pop
            | Self::PC
            | Self::MSize
            | Self::Gas
            | Self::Push0 => GasCost::Fixed(2),
            Self::Add
            | Self::Sub
            | Self::Lt
            | Self::Gt
            | Self::SLt
            | Self::SGt
            | Self::Eq
            | Self::IsZero
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Not
            | Self::Byte
            | Self::Shl
            | Self::Shr
            | Self::Sar
            | Self::CallDataLoad
            | Self::MLoad
            | Self::MStore
            | Self::MStore8
            | Self::Push(_)
            | Self::Dup(_)
            | Self::Swap(_) => GasCost::Fixed(3),
            Self::Mul
            | Self::Div
            | Self::SDiv
            | Self::Mod
            | Self::SMod
            | Self::SignExtend
            | Self::SelfBalance => GasCost::Fixed(5),
            Self::AddMod | Self::MulMod | Self::Jump => GasCost::Fixed(8),
            Self::JumpI => GasCost::Fixed(10),
            Self::BlockHash => GasCost::Fixed(20),
            Self::Exp => GasCost::Dynamic { estimate: 10 },
            Self::Sha3 => GasCost::Dynamic { estimate: 30 },
            Self::CallDataCopy | Self::CodeCopy | Self::ReturnDataCopy => {
                GasCost::Dynamic { estimate: 3 }
            }
            Self::Balance
            | Self::ExtCodeSize
            | Self::ExtCodeCopy
            | Self::ExtCodeHash
            | Self::Call
            | Self::CallCode
            | Self::DelegateCall
            | Self::StaticCall => GasCost::Dynamic { estimate: 2600 },
            Self::SLoad => GasCost::Dynamic { estimate: 2100 },
            Self::SStore => GasCost::Dynamic { estimate: 20_000 },
            Self::Log(n) => GasCost::Dynamic {
                estimate: 375 * (u64::from(*n) + 1),
            },
            Self::Create | Self::Create2 => GasCost::Dynamic { estimate: 32_000 },
            Self::SelfDestruct => GasCost::Dynamic { estimate: 5_000 },
        }
    }
}

impl Display for Mnemonic {
    /// Formats the mnemonic using its conventional assembly spelling, with
    /// unassigned bytes rendered as `UNKNOWN(0xNN)`.
    #[allow(clippy::too_many_lines)] // Splitting the table up brings no benefit
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stop => write!(f, "STOP"),
            Self::Add => write!(f, "ADD"),
            Self::Mul => write!(f, "MUL"),
            Self::Sub => write!(f, "SUB"),
            Self::Div => write!(f, "DIV"),
            Self::SDiv => write!(f, "SDIV"),
            Self::Mod => write!(f, "MOD"),
            Self::SMod => write!(f, "SMOD"),
            Self::AddMod => write!(f, "ADDMOD"),
            Self::MulMod => write!(f, "MULMOD"),
            Self::Exp => write!(f, "EXP"),
            Self::SignExtend => write!(f, "SIGNEXTEND"),
            Self::Lt => write!(f, "LT"),
            Self::Gt => write!(f, "GT"),
            Self::SLt => write!(f, "SLT"),
            Self::SGt => write!(f, "SGT"),
            Self::Eq => write!(f, "EQ"),
            Self::IsZero => write!(f, "ISZERO"),
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Xor => write!(f, "XOR"),
            Self::Not => write!(f, "NOT"),
            Self::Byte => write!(f, "BYTE"),
            Self::Shl => write!(f, "SHL"),
            Self::Shr => write!(f, "SHR"),
            Self::Sar => write!(f, "SAR"),
            Self::Sha3 => write!(f, "SHA3"),
            Self::Address => write!(f, "ADDRESS"),
            Self::Balance => write!(f, "BALANCE"),
            Self::Origin => write!(f, "ORIGIN"),
            Self::Caller => write!(f, "CALLER"),
            Self::CallValue => write!(f, "CALLVALUE"),
            Self::CallDataLoad => write!(f, "CALLDATALOAD"),
            Self::CallDataSize => write!(f, "CALLDATASIZE"),
            Self::CallDataCopy => write!(f, "CALLDATACOPY"),
            Self::CodeSize => write!(f, "CODESIZE"),
            Self::CodeCopy => write!(f, "CODECOPY"),
            Self::GasPrice => write!(f, "GASPRICE"),
            Self::ExtCodeSize => write!(f, "EXTCODESIZE"),
            Self::ExtCodeCopy => write!(f, "EXTCODECOPY"),
            Self::ReturnDataSize => write!(f, "RETURNDATASIZE"),
            Self::ReturnDataCopy => write!(f, "RETURNDATACOPY"),
            Self::ExtCodeHash => write!(f, "EXTCODEHASH"),
            Self::BlockHash => write!(f, "BLOCKHASH"),
            Self::CoinBase => write!(f, "COINBASE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Number => write!(f, "NUMBER"),
            Self::Prevrandao => write!(f, "PREVRANDAO"),
            Self::GasLimit => write!(f, "GASLIMIT"),
            Self::ChainId => write!(f, "CHAINID"),
            Self::SelfBalance => write!(f, "SELFBALANCE"),
            Self::BaseFee => write!(f, "BASEFEE"),
            Self::Pop => write!(f, "POP"),
            Self::MLoad => write!(f, "MLOAD"),
            Self::MStore => write!(f, "MSTORE"),
            Self::MStore8 => write!(f, "MSTORE8"),
            Self::SLoad => write!(f, "SLOAD"),
            Self::SStore => write!(f, "SSTORE"),
            Self::Jump => write!(f, "JUMP"),
            Self::JumpI => write!(f, "JUMPI"),
            Self::PC => write!(f, "PC"),
            Self::MSize => write!(f, "MSIZE"),
            Self::Gas => write!(f, "GAS"),
            Self::JumpDest => write!(f, "JUMPDEST"),
            Self::Push0 => write!(f, "PUSH0"),
            Self::Push(n) => write!(f, "PUSH{n}"),
            Self::Dup(n) => write!(f, "DUP{n}"),
            Self::Swap(n) => write!(f, "SWAP{n}"),
            Self::Log(n) => write!(f, "LOG{n}"),
            Self::Create => write!(f, "CREATE"),
            Self::Call => write!(f, "CALL"),
            Self::CallCode => write!(f, "CALLCODE"),
            Self::Return => write!(f, "RETURN"),
            Self::DelegateCall => write!(f, "DELEGATECALL"),
            Self::Create2 => write!(f, "CREATE2"),
            Self::StaticCall => write!(f, "STATICCALL"),
            Self::Revert => write!(f, "REVERT"),
            Self::Invalid => write!(f, "INVALID"),
            Self::SelfDestruct => write!(f, "SELFDESTRUCT"),
            Self::Unknown(byte) => write!(f, "UNKNOWN(0x{byte:02x})"),
        }
    }
}

impl Serialize for Mnemonic {
    /// Serialises the mnemonic as its conventional assembly spelling, which
    /// is the closed vocabulary consumed by UI collaborators.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The cost of an instruction under the static gas schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum GasCost {
    /// A cost that is independent of the machine state.
    Fixed(u64),

    /// A cost that depends on runtime state (storage access sets, memory
    /// expansion, call targets), carrying the flat estimate used when no
    /// trace data is available.
    Dynamic {
        /// The flat figure substituted for the true state-dependent cost.
        estimate: u64,
    },
}

impl GasCost {
    /// Gets the flat gas figure for the cost, regardless of whether it is
    /// state-dependent.
    #[must_use]
    pub fn estimate(&self) -> u64 {
        match self {
            Self::Fixed(cost) | Self::Dynamic { estimate: cost } => *cost,
        }
    }

    /// Checks whether the true cost depends on runtime state.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic { .. })
    }
}
