pub mod hit_test;
pub mod input;
pub mod keyboard_hook;
pub mod messages;
pub mod model;
pub mod overlay;
pub mod render;
pub mod settings;
pub mod settings_store;
pub mod state;

pub use hit_test::hit_test;
pub use input::{GuideSession, GuideTuning};
pub use messages::{GuideEvent, HostEffect};
pub use model::{GuideModel, Point, ScreenSize};
pub use overlay::{run_overlay, OverlayDriver};
pub use render::{render_guide, FrameBuffer, GuideStyle, GuideSurface};
pub use settings::GuideSettings;
pub use state::{DragTarget, InteractionMode, InteractionPhase, InteractionState};
