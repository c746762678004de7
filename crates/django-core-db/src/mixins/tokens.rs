//! Models identified by a unique random token.

use django_core_common::error::CoreResult;

use crate::managers::TokenManager;
use crate::model::Model;
use crate::store::ModelStore;

/// A model with a unique `token` field.
///
/// Implementors should list the token field in
/// [`Model::unique_field_names`] so stores enforce it.
pub trait TokenModel: Model {
    /// Length of tokens generated for new instances.
    const TOKEN_LENGTH: usize = 15;

    /// Name of the token field.
    fn token_field_name() -> &'static str {
        "token"
    }

    /// The current token, if any.
    fn token(&self) -> Option<&str>;

    /// Sets the token.
    fn set_token(&mut self, token: String);
}

/// Gives every instance without a token a fresh, unused one.
///
/// Tokens are fetched in a single [`TokenManager::get_available_tokens`] call
/// sized to the number of instances that need one.
pub async fn assign_tokens<M, S>(store: &S, instances: &mut [M]) -> CoreResult<()>
where
    M: TokenModel,
    S: ModelStore<M> + ?Sized,
{
    let missing: Vec<usize> = instances
        .iter()
        .enumerate()
        .filter(|(_, obj)| obj.token().map_or(true, str::is_empty))
        .map(|(i, _)| i)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let tokens = store
        .get_available_tokens(missing.len(), M::TOKEN_LENGTH)
        .await?;
    for (index, token) in missing.into_iter().zip(tokens) {
        instances[index].set_token(token);
    }
    Ok(())
}
