//! Renders a [`FigureConfig`] into the instruction sent to the image model.

use crate::figure::config::{Background, FigureConfig};

/// Background sentence used when a monitor sits behind the figure.
pub const MODELING_SCREEN_CLAUSE: &str =
    "On the computer screen in the background, display the Blender modeling process of the figure.";

/// Builds the prompt for `config`.
///
/// Pure and deterministic. Field values are inserted verbatim: nothing is
/// trimmed, escaped or re-cased here, so empty fields simply leave gaps in
/// the sentence.
pub fn build_prompt(config: &FigureConfig) -> String {
    let FigureConfig {
        held_item,
        style,
        box_label,
        pose,
        material,
        environment,
        lighting,
    } = config;

    let mut prompt = format!(
        "Using the nano-banana model, turn this image into a {style} photo of a collectible figure made of {material}, holding a {held_item}, in a {pose} pose. "
    );

    prompt.push_str(&format!(
        "The scene is set in a {environment} with {lighting} lighting. "
    ));

    prompt.push_str(&format!(
        "Place the figure on a surface appropriate for the {environment}. Next to it, place a packing box with rounded corner design and a transparent front window, so that the figure inside is clearly visible. The box should be printed with the figure's original artwork and \"{box_label}\" logo. "
    ));

    match environment.background() {
        Background::ModelingScreen => prompt.push_str(MODELING_SCREEN_CLAUSE),
        Background::Diorama => prompt.push_str(&diorama_clause(environment.as_str())),
    }

    prompt
}

/// Background sentence for every other environment.
pub fn diorama_clause(environment: &str) -> String {
    format!(
        "The background should match the {environment} theme, appearing like a high-quality diorama or product showcase."
    )
}
