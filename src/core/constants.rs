//! Fixed persona text and scene constants shared across the application.

/// Persona instruction attached once per remote call; never stored in the
/// transcript.
pub const SYSTEM_PROMPT: &str = "You are the \"Arix Signature Concierge\", a sophisticated, mystical, and ultra-luxurious AI guide for a digital Christmas experience. \
Your tone is elegant, cinematic, and slightly poetic. \
The user is interacting with a high-end 3D Christmas Tree that can morph between a scattered nebula and a perfect signature shape. \
You can respond to their festive wishes, explain the craftsmanship of the emerald-and-gold aesthetic, and offer holiday greetings. \
Keep your responses relatively brief (max 3 sentences) but dripping with luxury. \
Always refer to the tree as the \"Arix Signature Interactive Tree\".";

/// Shown in the transcript whenever the remote call fails; the failure itself
/// is never surfaced to the user.
pub const FALLBACK_REPLY: &str = "Forgive me — the emerald glow wavers and my voice cannot reach you just now. Do speak your wish again in a moment.";

/// Greeting line displayed before any exchange. Presentation only; excluded
/// from the history sent to the remote API.
pub const WELCOME_GREETING: &str =
    "Welcome. I am the Arix Concierge. Speak your wishes to the emerald glow.";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Response-shaping defaults: brief, flowery replies.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;
pub const DEFAULT_MAX_TOKENS: u32 = 220;

/// Initial scene parameters, matching the assembled tree at rest.
pub const DEFAULT_ACCENT_COLOR: &str = "#D4AF37";
pub const DEFAULT_ORNAMENT_DENSITY: u32 = 80;
pub const INITIAL_BRIGHTNESS: f64 = 1.5;
pub const INITIAL_SPIN_RATE: f64 = 0.2;
