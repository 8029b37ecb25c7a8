// Global theme colours and constants
// All colours are u32 in packed ARGB format: 0xAARRGGBB
// The alpha byte is honoured by the canvas when blending

// Backdrop
pub const BACKGROUND: u32 = 0xFF_0A_0F_1C; // Deep navy behind the field

// Particles
pub const PARTICLE_FILL: u32 = 0x80_64_FF_DA; // Teal dots at half opacity

// Connection lines (alpha is replaced by the per-pair opacity)
pub const CONNECTION_STROKE: u32 = 0xFF_64_FF_DA;
