//! Channel factories for work handed off to background processors.

use super::types::MatchEndNotice;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// Match-end notices are rare; the bound only has to absorb a burst of
/// several matches finishing in the same poll.
pub const DEFAULT_CHANNEL_BUFFER: usize = 32;

/// Sender handle for MatchEndNotice events.
pub type MatchEndNoticeSender = mpsc::Sender<MatchEndNotice>;
/// Receiver handle for MatchEndNotice events.
pub type MatchEndNoticeReceiver = mpsc::Receiver<MatchEndNotice>;

/// Create a new MatchEndNotice channel.
pub fn match_end_notice_channel() -> (MatchEndNoticeSender, MatchEndNoticeReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
