/// What the frame loop should do after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; the next frame can render.
    Reconfigured,
    SkipFrame,
    /// Stop the runtime.
    Fatal,
}
