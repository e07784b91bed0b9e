/// Rendering options and their JSON configuration form
pub mod csv_options;

/// CSV renderer and its builder
pub mod csv_renderer;
