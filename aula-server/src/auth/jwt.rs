//! JWT 令牌服务
//!
//! HS256 令牌：登录时签发，每个 `/api` 请求校验一次。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::models::{Role, User};
use thiserror::Error;

use super::policy::{Capability, Policy};

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC 密钥，`Config::validate` 要求至少 32 字节
    pub secret: String,
    /// 有效期 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!("JWT_SECRET not set! Generating temporary key for this process.");
                generate_secure_printable_jwt_secret()
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24 * 60),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "aula-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "aula-clients".to_string()),
        }
    }
}

/// 令牌载荷：用户身份 + 角色
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 显示名
    pub name: String,
    pub email: String,
    /// 角色 (`ADMIN` | `USER`)
    pub role: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// 生成可打印的安全 JWT 密钥 (64 字符)
pub fn generate_secure_printable_jwt_secret() -> String {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    if rng.fill(&mut bytes).is_err() {
        // 随机数生成失败时退回到时间戳派生的密钥，仅用于开发
        return format!("aula-dev-key-{:0>48}", Utc::now().timestamp_nanos_opt().unwrap_or(0));
    }

    bytes
        .iter()
        .map(|b| ALLOWED[(*b as usize) % ALLOWED.len()] as char)
        .collect()
}

/// JWT 令牌服务
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// 按给定配置构建 (测试和 `ServerState` 使用)
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为用户生成新令牌
    pub fn generate_token(&self, user: &User) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 取出 `Bearer <token>` 中的令牌部分
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// 已认证的调用者
///
/// `require_auth` 解析令牌后放入请求扩展，处理函数通过提取器拿到
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("invalid subject: {}", claims.sub)))?;
        let role = Role::parse(&claims.role)
            .ok_or_else(|| JwtError::InvalidToken(format!("invalid role: {}", claims.role)))?;

        Ok(Self {
            id,
            name: claims.name,
            email: claims.email,
            role,
        })
    }
}

impl CurrentUser {
    /// 是否管理员
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 检查角色是否拥有指定能力
    pub fn can(&self, capability: Capability) -> bool {
        self.role.grants(capability)
    }

    /// 是否可以操作属于 `owner_id` 的预约 (本人或拥有全局权限)
    pub fn can_act_on(&self, owner_id: i64) -> bool {
        self.id == owner_id || self.can(Capability::ActOnAnyReservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-key-that-is-long-enough-for-hs256".to_string(),
            expiration_minutes: 60,
            issuer: "aula-server".to_string(),
            audience: "aula-clients".to_string(),
        })
    }

    fn test_user(role: Role) -> User {
        User {
            id: 42,
            name: "Ana Torres".to_string(),
            email: "ana@example.com".to_string(),
            role,
            phone: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let service = test_service();
        let token = service
            .generate_token(&test_user(Role::Admin))
            .expect("token for seeded user");

        let claims = service
            .validate_token(&token)
            .expect("freshly issued token validates");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.role, "ADMIN");

        let user = CurrentUser::try_from(claims).expect("claims should convert");
        assert_eq!(user.id, 42);
        assert!(user.is_admin());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = test_service();
        let token = service.generate_token(&test_user(Role::User)).unwrap();

        let other = JwtService::with_config(JwtConfig {
            secret: "another-secret-key-that-is-long-enough-too".to_string(),
            ..service.config.clone()
        });
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::with_config(JwtConfig {
            expiration_minutes: -5,
            ..test_service().config
        });
        let token = service.generate_token(&test_user(Role::User)).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let service = test_service();
        let token = service.generate_token(&test_user(Role::User)).unwrap();
        let other = JwtService::with_config(JwtConfig {
            audience: "someone-else".to_string(),
            ..service.config.clone()
        });
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }

    #[test]
    fn test_owner_or_admin() {
        let user = CurrentUser {
            id: 7,
            name: "Luis".to_string(),
            email: "luis@example.com".to_string(),
            role: Role::User,
        };
        assert!(user.can_act_on(7));
        assert!(!user.can_act_on(8));

        let admin = CurrentUser {
            role: Role::Admin,
            ..user
        };
        assert!(admin.can_act_on(8));
    }

    #[test]
    fn test_printable_secret() {
        let secret = generate_secure_printable_jwt_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.is_ascii());
    }
}
