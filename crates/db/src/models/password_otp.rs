use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

use crate::entities::password_otp;

/// One-time reset codes, a single live row per email. Verification never
/// consumes a code; consumption is a single conditional DELETE so a code
/// cannot be redeemed twice.
pub struct PasswordOtp;

impl PasswordOtp {
    pub async fn upsert<C: ConnectionTrait>(
        db: &C,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let active = password_otp::ActiveModel {
            email: Set(email.to_string()),
            otp_code: Set(code.to_string()),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        password_otp::Entity::insert(active)
            .on_conflict(
                OnConflict::column(password_otp::Column::Email)
                    .update_columns([
                        password_otp::Column::OtpCode,
                        password_otp::Column::ExpiresAt,
                        password_otp::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn verify<C: ConnectionTrait>(
        db: &C,
        email: &str,
        code: &str,
    ) -> Result<bool, DbErr> {
        let found = password_otp::Entity::find()
            .filter(password_otp::Column::Email.eq(email))
            .filter(password_otp::Column::OtpCode.eq(code))
            .filter(password_otp::Column::ExpiresAt.gt(Utc::now()))
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    /// Redeem a live code. Returns false when no matching unexpired row
    /// existed, so concurrent redeemers cannot both succeed.
    pub async fn consume<C: ConnectionTrait>(
        db: &C,
        email: &str,
        code: &str,
    ) -> Result<bool, DbErr> {
        let result = password_otp::Entity::delete_many()
            .filter(password_otp::Column::Email.eq(email))
            .filter(password_otp::Column::OtpCode.eq(code))
            .filter(password_otp::Column::ExpiresAt.gt(Utc::now()))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
