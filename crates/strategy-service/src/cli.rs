//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strategy_types::{Address, DefaultStrategyState, StrategyHash};

#[derive(Parser, Debug)]
#[command(name = "strategy-registry")]
#[command(about = "Strategy registry administration", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "STRATEGY_CONFIG", default_value = "config/registry.toml")]
	pub config: PathBuf,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(short, long, env = "STRATEGY_LOG_LEVEL")]
	pub log_level: Option<String>,

	/// Address the operation is performed as; defaults to `registry.caller`
	#[arg(long, env = "STRATEGY_CALLER")]
	pub caller: Option<Address>,

	/// Subcommand to execute
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Validate the configuration file
	Validate,

	/// Add the risk profiles listed in the configuration
	Setup,

	/// Print the token hash of an ordered token group
	HashTokens {
		#[arg(required = true)]
		tokens: Vec<Address>,
		/// Use the pre chain-id hash
		#[arg(long)]
		legacy: bool,
	},

	/// Approve a single token
	ApproveToken { token: Address },

	/// Approve several tokens at once
	ApproveTokens {
		#[arg(required = true)]
		tokens: Vec<Address>,
	},

	/// Approve a token group and map its hash
	MapTokens {
		#[arg(required = true)]
		tokens: Vec<Address>,
	},

	/// Add a risk profile
	AddRiskProfile {
		code: u64,
		name: String,
		symbol: String,
		#[arg(long)]
		can_borrow: bool,
		#[arg(long, default_value_t = 0)]
		lower: u8,
		#[arg(long, default_value_t = 10)]
		upper: u8,
	},

	/// Register a strategy for an underlying token
	AddStrategy {
		underlying: Address,
		/// Steps as `pool,output,flag-pool,output,flag`
		steps: String,
	},

	/// Delete a registered strategy
	DeleteStrategy { hash: StrategyHash },

	/// List every registered strategy
	GetAllStrategies,

	/// Approve a liquidity pool
	ApproveLiquidityPool { pool: Address },

	/// Rate an approved liquidity pool
	RateLiquidityPool { pool: Address, rating: u8 },

	/// Map a liquidity pool to its adapter
	MapLiquidityPoolAdapter {
		pool: Address,
		adapter: Address,
		/// Approve the pool in the same transaction if needed
		#[arg(long)]
		approve: bool,
	},

	/// Approve a swap pool
	ApproveSwapPool { pool: Address },

	/// Rate an approved swap pool
	RateSwapPool { pool: Address, rating: u8 },

	/// Approve a credit pool
	ApproveCreditPool { pool: Address },

	/// Rate an approved credit pool
	RateCreditPool { pool: Address, rating: u8 },

	/// Pin the best (or default) strategy for a risk profile and token group
	SetBestStrategy {
		risk_profile: u64,
		#[arg(long, required = true, value_delimiter = ',')]
		tokens: Vec<Address>,
		/// Registered strategy to pin
		#[arg(long, conflicts_with = "steps")]
		hash: Option<StrategyHash>,
		/// Inline steps to pin; an empty string clears the slot
		#[arg(long)]
		steps: Option<String>,
		/// Write the default slot instead of the best slot
		#[arg(long)]
		default: bool,
	},

	/// Show the best (or default) strategy for a risk profile and token group
	GetBestStrategy {
		risk_profile: u64,
		#[arg(long, required = true, value_delimiter = ',')]
		tokens: Vec<Address>,
		#[arg(long)]
		default: bool,
	},

	/// Choose where default strategies come from (default-slot or apr-oracle)
	SetDefaultStrategyState { state: DefaultStrategyState },

	/// Resolve the strategy a vault should run
	Resolve {
		risk_profile: u64,
		#[arg(long, required = true, value_delimiter = ',')]
		tokens: Vec<Address>,
	},
}
