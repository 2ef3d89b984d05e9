//! # Fee and Gas Estimation
//!
//! Fee models, fee-rate suggestions, and gas estimation arithmetic shared by
//! every chain family.
//!
//! ## Available Components
//!
//! - [`FeeModel`] - Legacy vs dynamic (EIP-1559) fee market, fixed per client
//! - [`FeeRates`] - The `(base_fee, tip_cap, fee_cap)` suggestion triple
//! - [`GasEstimator`] - Safety-margin arithmetic over raw estimates
//! - [`gas_shortfall`] - Balance shortfall for a planned fee

use crate::types::FeeLimit;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fee market model of a chain, selected once at client construction.
///
/// Every transaction built by a client follows its model; there is no
/// per-call renegotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeModel {
    /// Single flat gas price (legacy EVM chains and flat-fee families).
    Legacy,
    /// EIP-1559 dynamic fees with a max fee and a priority tip.
    Dynamic,
}

impl FeeModel {
    /// Derives the model from a configuration flag.
    #[must_use]
    pub const fn from_dynamic_flag(dynamic: bool) -> Self {
        if dynamic { Self::Dynamic } else { Self::Legacy }
    }

    /// Returns true for the dynamic (EIP-1559) model.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }
}

impl fmt::Display for FeeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Suggested fee rates: base fee, priority tip cap, and absolute fee cap.
///
/// On flat-fee chains only `fee_cap` is meaningful and the other two are
/// zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRates {
    /// Portion of the fee cap attributable to the base fee.
    pub base_fee: U256,
    /// Suggested priority tip per gas unit.
    pub tip_cap: U256,
    /// Suggested absolute price per gas unit.
    pub fee_cap: U256,
}

impl FeeRates {
    /// Builds rates for a dynamic-fee chain from the suggested price and
    /// tip. The base fee is `fee_cap - tip_cap` when the cap exceeds the
    /// tip, otherwise zero.
    #[must_use]
    pub fn dynamic(fee_cap: U256, tip_cap: U256) -> Self {
        let base_fee = if fee_cap > tip_cap {
            fee_cap - tip_cap
        } else {
            U256::zero()
        };
        Self {
            base_fee,
            tip_cap,
            fee_cap,
        }
    }

    /// Builds rates for a flat-fee chain: `(0, 0, gas_price)`.
    #[must_use]
    pub fn flat(gas_price: U256) -> Self {
        Self {
            base_fee: U256::zero(),
            tip_cap: U256::zero(),
            fee_cap: gas_price,
        }
    }

    /// Returns true when only the fee cap carries information.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.base_fee.is_zero() && self.tip_cap.is_zero()
    }

    /// Combines these rates with a gas budget into a [`FeeLimit`].
    #[must_use]
    pub fn fee_limit(&self, gas: U256) -> FeeLimit {
        FeeLimit::new(gas, self.fee_cap, self.tip_cap)
    }
}

/// Gas estimation arithmetic: safety margin and minimum transfer cost.
///
/// The margin covers estimation drift between simulation and inclusion; the
/// minimum is the intrinsic cost of a plain value transfer, returned without
/// a chain round trip when there is no call data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimator {
    buffer_percent: u64,
    min_transfer_gas: u64,
}

impl GasEstimator {
    /// Default safety margin applied to simulated estimates.
    pub const DEFAULT_BUFFER_PERCENT: u64 = 20;

    /// Intrinsic gas cost of a plain value transfer.
    pub const MIN_TRANSFER_GAS: u64 = 21_000;

    /// Creates an estimator with the given margin percentage.
    #[must_use]
    pub const fn new(buffer_percent: u64) -> Self {
        Self {
            buffer_percent,
            min_transfer_gas: Self::MIN_TRANSFER_GAS,
        }
    }

    /// Creates an estimator with the default margin.
    #[must_use]
    pub const fn with_default_buffer() -> Self {
        Self::new(Self::DEFAULT_BUFFER_PERCENT)
    }

    /// Returns the margin percentage.
    #[must_use]
    pub const fn buffer_percent(&self) -> u64 {
        self.buffer_percent
    }

    /// Returns the minimum transfer gas as a [`U256`].
    #[must_use]
    pub fn min_transfer_gas(&self) -> U256 {
        U256::from(self.min_transfer_gas)
    }

    /// Applies the safety margin to a raw estimate, rounding up.
    ///
    /// `apply_buffer(100)` is 120 at the default margin; fractional results
    /// round toward the safe side (`apply_buffer(11)` is 14, not 13).
    #[must_use]
    pub fn apply_buffer(&self, estimate: U256) -> U256 {
        let scaled = estimate * U256::from(100 + self.buffer_percent);
        let quotient = scaled / U256::from(100);
        if (scaled % U256::from(100)).is_zero() {
            quotient
        } else {
            quotient + U256::one()
        }
    }
}

impl Default for GasEstimator {
    fn default() -> Self {
        Self::with_default_buffer()
    }
}

/// Returns how much native balance is missing to pay `gas * gas_price`,
/// saturating at zero when the balance covers the fee.
#[must_use]
pub fn gas_shortfall(balance: U256, gas: U256, gas_price: U256) -> U256 {
    let required = gas.saturating_mul(gas_price);
    required.saturating_sub(balance)
}
