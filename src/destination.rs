use crate::logger::Logger;
use crate::payload::Payload;
use std::error::Error;

/// A sink receiving every payload a [`Logger`] emits.
///
/// Implementations transport payloads to a concrete target (a metrics
/// pipeline, an audit table, a test collector, etc). The logger calls
/// `call` synchronously on the logging thread, once per log entry, with
/// an independent copy of the payload so one destination can never
/// corrupt what another sees.
///
/// **Parameters**
/// - `logger`: the emitting logger, for identity checks and its name.
/// - `payload`: owned copy of the finished field mapping.
/// - `group_ids`: ids of the active non-anonymous groups, oldest first
///   (global stack before instance stack).
///
/// **Returns**
/// - `Ok(())` if the payload was accepted.
/// - `Err(..)` on failure. The logger reports the error on stderr and
///   carries on: a failing destination never blocks its siblings and
///   never propagates to the caller of the log statement.
pub trait Destination: Send + Sync {
    fn call(
        &self,
        logger: &Logger,
        payload: Payload,
        group_ids: &[String],
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

impl<F> Destination for F
where
    F: Fn(&Logger, Payload, &[String]) -> Result<(), Box<dyn Error + Send + Sync>>
        + Send
        + Sync,
{
    fn call(
        &self,
        logger: &Logger,
        payload: Payload,
        group_ids: &[String],
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self(logger, payload, group_ids)
    }
}

/// A destination that simply drops all payloads.
///
/// Useful for measuring dispatch overhead and for tests that only care
/// that dispatch happened.
#[derive(Clone, Copy, Default)]
pub struct NoopDestination;

impl Destination for NoopDestination {
    fn call(
        &self,
        _logger: &Logger,
        _payload: Payload,
        _group_ids: &[String],
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
