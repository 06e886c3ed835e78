use vidfetch_resolver_api::url::Url;
use vidfetch_resolver_api::ResolveError;

/// Checks user input before anything goes out on the network.
/// Returns the trimmed input as typed; parsing only decides whether it is a URL.
pub fn validate_target(input: &str) -> Result<&str, ResolveError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ResolveError::InvalidInput(
            "Enter a video URL first.".to_string(),
        ));
    }
    Url::parse(input)
        .map(|_| input)
        .map_err(|_| ResolveError::InvalidInput("Invalid URL format.".to_string()))
}
