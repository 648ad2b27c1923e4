use std::future::Future;

use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// What a tick callback wants the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// Runs `tick` every `period` until the token is cancelled or the callback
/// asks to stop. The first tick fires one full period after the call.
pub async fn ticker_loop<F, Fut>(period: Duration, cancel_token: CancellationToken, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TickFlow>,
{
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                if tick().await == TickFlow::Stop {
                    break;
                }
            }
        }
    }
}
