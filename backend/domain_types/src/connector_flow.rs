#[derive(Debug, Clone)]
pub struct CreateAccessToken;

#[derive(Debug, Clone)]
pub struct CreatePayment;

#[derive(Debug, Clone)]
pub struct UpdatePayment;

#[derive(Debug, Clone)]
pub struct VerifyPayment;

#[derive(Debug, Clone)]
pub struct SettlePayment;

#[derive(Debug, Clone)]
pub struct CancelPayment;

#[derive(Debug, Clone)]
pub struct CheckEligibility;

#[derive(strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlowName {
    CreateAccessToken,
    CreatePayment,
    UpdatePayment,
    VerifyPayment,
    SettlePayment,
    CancelPayment,
    CheckEligibility,
}
