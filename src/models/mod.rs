pub mod poll;
pub mod user;

pub use poll::{
    OptionCount, OptionTally, Poll, PollOption, PollResults, PollSummary, UserStats, Vote,
    VoteDetail,
};
pub use user::{PublicUser, User};
