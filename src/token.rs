use include_dir::{include_dir, Dir};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TokenError;

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalog");

pub const POKEAPI_URL: &str = "https://pokeapi.co/api/v2/pokemon";

/// Highest id drawn when tokens come from PokeAPI.
pub const POKEAPI_LAST_ID: u32 = 512;

/// A face that can appear on a pair of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub image: String,
    pub name: String,
    pub id: u32,
}

/// Anything that can turn a token id into a [`Token`].
pub trait TokenSource {
    fn fetch(&self, id: u32) -> Result<Token, TokenError>;
}

/// Draw `count` tokens with ids picked uniformly from `start..=end`.
///
/// Requests are made one at a time. `count` is clamped to the size of the
/// range, but ids are drawn independently, so the same token may come back
/// more than once.
pub fn fetch_tokens<S, R>(
    source: &S,
    count: usize,
    start: u32,
    end: u32,
    rng: &mut R,
) -> Result<Vec<Token>, TokenError>
where
    S: TokenSource + ?Sized,
    R: Rng + ?Sized,
{
    if start > end {
        return Err(TokenError::EmptyRange { start, end });
    }
    let range_size = (end - start) as usize + 1;
    let count = count.min(range_size);

    let mut tokens = Vec::with_capacity(count);
    for _ in 0..count {
        let id = rng.gen_range(start..=end);
        let token = source.fetch(id).inspect_err(|e| warn!(id, error = %e, "token fetch failed"))?;
        debug!(id, name = %token.name, "fetched token");
        tokens.push(token);
    }
    Ok(tokens)
}

/// Tokens bundled into the binary, so a round never needs the network.
#[derive(Deserialize, Clone, Debug)]
pub struct EmbeddedCatalog {
    pub name: String,
    pub size: u32,
    /// Artwork URL template; `{id}` is replaced with the token id.
    pub image_url: String,
    /// Token names; the token at index `i` has id `i + 1`.
    pub tokens: Vec<String>,
}

impl EmbeddedCatalog {
    pub fn load(name: &str) -> Result<Self, TokenError> {
        let file = CATALOG_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| TokenError::Catalog(name.to_string()))?;
        let text = file
            .contents_utf8()
            .ok_or_else(|| TokenError::Catalog(name.to_string()))?;
        serde_json::from_str(text).map_err(|_| TokenError::Catalog(name.to_string()))
    }

    pub fn kanto() -> Result<Self, TokenError> {
        Self::load("kanto")
    }

    /// Highest id this catalog can serve.
    pub fn last_id(&self) -> u32 {
        self.tokens.len() as u32
    }
}

impl TokenSource for EmbeddedCatalog {
    fn fetch(&self, id: u32) -> Result<Token, TokenError> {
        let name = id
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i as usize))
            .ok_or(TokenError::UnknownId(id))?;

        Ok(Token {
            image: self.image_url.replace("{id}", &id.to_string()),
            name: name.clone(),
            id,
        })
    }
}

#[derive(Deserialize)]
struct PokemonPayload {
    id: u32,
    name: String,
    sprites: Sprites,
}

#[derive(Deserialize)]
struct Sprites {
    other: OtherSprites,
}

#[derive(Deserialize)]
struct OtherSprites {
    #[serde(rename = "official-artwork")]
    official_artwork: Artwork,
}

#[derive(Deserialize)]
struct Artwork {
    front_default: Option<String>,
}

/// Tokens looked up live from PokeAPI, one request per token.
#[derive(Debug, Clone)]
pub struct PokeApiSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl PokeApiSource {
    pub fn new() -> Self {
        Self::with_base_url(POKEAPI_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for PokeApiSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for PokeApiSource {
    fn fetch(&self, id: u32) -> Result<Token, TokenError> {
        let payload: PokemonPayload = self
            .client
            .get(format!("{}/{id}", self.base_url.trim_end_matches('/')))
            .send()?
            .error_for_status()?
            .json()?;

        let image = payload
            .sprites
            .other
            .official_artwork
            .front_default
            .ok_or(TokenError::Decode {
                id,
                field: "sprites.other.official-artwork.front_default",
            })?;

        Ok(Token {
            image,
            name: payload.name,
            id: payload.id,
        })
    }
}
