//! Turns a photo into a chibi figure on a computer desk.
//!
//! Run with: `cargo run --example figure_from_photo -- <photo.jpg>`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use figurize::{FigureClient, FigureConfig, GeminiProvider, SourceImage, Style};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: figure_from_photo <photo.jpg>");

    let photo = SourceImage::from_path(&input_path)?;
    let client = FigureClient::new(GeminiProvider::builder().build()?);

    let config = FigureConfig::default()
        .with_style(Style::Chibi)
        .with_held_item("Coffee Mug")
        .with_box_label("Desk Buddy");

    let result = client.generate(&photo, &config).await?;
    let image = result.to_image()?;
    image.save("figure.png")?;
    println!("Figure saved to figure.png ({} bytes)", image.size());
    if let Some(text) = result.text {
        println!("{text}");
    }

    Ok(())
}
