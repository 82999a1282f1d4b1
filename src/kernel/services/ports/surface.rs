use crate::kernel::bridge::SurfaceCommand;

/// Outbound half of the surface channel.
pub trait SurfaceSink: Send {
    fn send(&self, command: &SurfaceCommand);
}

/// Discards every command; used by headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl SurfaceSink for NullSurface {
    fn send(&self, command: &SurfaceCommand) {
        tracing::trace!(?command, "no surface attached");
    }
}
