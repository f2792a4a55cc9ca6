//! Wrappers and their factories.
//!
//! Every factory here implements [`WrapperFactory`](metaschool_core::WrapperFactory)
//! over [`BoxEnv`](metaschool_core::BoxEnv), so they can be chained in any
//! order on top of any base environment with matching observation type.
mod episode_stats;
mod obs_mask;
mod reward_scale;
mod time_limit;
pub use episode_stats::{EpisodeStatistics, EpisodeStatisticsFactory};
pub use obs_mask::{ObsMask, ObsMaskFactory};
pub use reward_scale::{RewardScale, RewardScaleFactory};
pub use time_limit::{TimeLimit, TimeLimitFactory};
