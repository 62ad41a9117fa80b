/*!
 * Monitoring
 * Structured tracing setup for the scheduler and its drivers
 */

mod tracer;

pub use tracer::{init_tracing, span_scheduling, TraceFormat};
