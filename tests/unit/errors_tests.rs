/*!
 * Tests for error type functionality
 */

use doctrans::errors::{
    AppError, ConfigurationError, OrchestratorError, ProcessingError, ProviderError,
};

#[test]
fn test_providerError_display_shouldIncludeDetail() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "service unavailable".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "API responded with error: 503 - service unavailable"
    );

    let error = ProviderError::RateLimitExceeded("slow down".to_string());
    assert!(error.to_string().contains("Rate limit exceeded"));
}

#[test]
fn test_providerError_isTransient_shouldSplitRetryableFromFatal() {
    assert!(ProviderError::ConnectionError("reset".into()).is_transient());
    assert!(ProviderError::RateLimitExceeded("429".into()).is_transient());
    assert!(
        ProviderError::ApiError {
            status_code: 500,
            message: "oops".into()
        }
        .is_transient()
    );

    assert!(!ProviderError::AuthenticationError("bad key".into()).is_transient());
    assert!(
        !ProviderError::ApiError {
            status_code: 400,
            message: "bad request".into()
        }
        .is_transient()
    );
    assert!(!ProviderError::ParseError("no choices".into()).is_transient());
}

#[test]
fn test_configurationError_display_shouldNameProvider() {
    let error = ConfigurationError::MissingCredential {
        provider: "openai".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Provider 'openai' requires an API key but none is configured"
    );
}

#[test]
fn test_processingError_fromProviderError_shouldWrap() {
    let provider_error = ProviderError::ConnectionError("timed out".to_string());
    let error: ProcessingError = provider_error.into();
    assert!(matches!(error, ProcessingError::Translation(_)));
    assert!(error.to_string().contains("timed out"));
}

#[test]
fn test_appError_fromDomainErrors_shouldConvert() {
    let app: AppError = ConfigurationError::UnknownProvider("x".into()).into();
    assert!(matches!(app, AppError::Configuration(_)));

    let app: AppError = OrchestratorError::Busy.into();
    assert!(matches!(app, AppError::Orchestrator(_)));
    assert!(app.to_string().contains("already running"));

    let app: AppError = std::io::Error::other("disk gone").into();
    assert!(matches!(app, AppError::File(_)));
}
