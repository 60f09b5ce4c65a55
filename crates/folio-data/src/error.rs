//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 제공자 오류.
///
/// 포트폴리오 엔진은 이 오류를 해당 종목의 "데이터 없음"으로 처리하고
/// 호출자에게 전파하지 않습니다.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터 소스 연결 오류
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
