//! Network capability: VPCs, subnets, security groups, key pairs and load
//! balancers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CredentialPayload, ProviderError};

/// Request to create a VPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpcSpec {
    /// Display name.
    pub name: String,
    /// IPv4 CIDR for the VPC ("10.0.0.0/16").
    pub cidr_block: String,
    /// Region to create the VPC in.
    pub region: String,
}

/// A VPC as reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vpc {
    /// Vendor resource identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// IPv4 CIDR.
    pub cidr_block: String,
    /// Region.
    pub region: String,
    /// Whether this is the account's default VPC.
    #[serde(default)]
    pub is_default: bool,
}

/// Request to create a subnet inside a VPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetSpec {
    /// Owning VPC.
    pub vpc_id: String,
    /// Display name.
    pub name: String,
    /// IPv4 CIDR, a subset of the VPC's.
    pub cidr_block: String,
    /// Availability zone, where the vendor has them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

/// A subnet as reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    /// Vendor resource identifier.
    pub id: String,
    /// Owning VPC.
    pub vpc_id: String,
    /// Display name.
    pub name: String,
    /// IPv4 CIDR.
    pub cidr_block: String,
    /// Availability zone, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

/// Direction a security-group rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleDirection {
    /// Inbound traffic.
    Ingress,
    /// Outbound traffic.
    Egress,
}

/// One security-group rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    /// Ingress or egress.
    pub direction: RuleDirection,
    /// IP protocol ("tcp", "udp", "icmp", "-1" for all).
    pub protocol: String,
    /// First port of the range, if port-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_port: Option<u16>,
    /// Last port of the range, if port-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<u16>,
    /// CIDR the rule applies to.
    pub cidr: String,
}

/// Request to create a security group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroupSpec {
    /// Owning VPC.
    pub vpc_id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// A security group as reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroup {
    /// Vendor resource identifier.
    pub id: String,
    /// Owning VPC.
    pub vpc_id: String,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Currently authorized rules.
    #[serde(default)]
    pub rules: Vec<SecurityGroupRule>,
}

/// Request to import an SSH key pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPairSpec {
    /// Key pair name.
    pub name: String,
    /// OpenSSH-format public key material.
    pub public_key: String,
}

/// A key pair as reported by a backend. The private half never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPair {
    /// Key pair name.
    pub name: String,
    /// Vendor fingerprint of the public key.
    pub fingerprint: String,
}

/// Listener on a load balancer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listener {
    /// Frontend port.
    pub port: u16,
    /// Frontend protocol ("tcp", "http", "https").
    pub protocol: String,
    /// Backend port traffic is forwarded to.
    pub target_port: u16,
}

/// Request to create a load balancer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancerSpec {
    /// Display name.
    pub name: String,
    /// Subnets the balancer spans.
    pub subnet_ids: Vec<String>,
    /// Listener configuration.
    pub listeners: Vec<Listener>,
}

/// Provisioning state of a load balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancerState {
    /// Still provisioning.
    Provisioning,
    /// Serving traffic.
    Active,
    /// Provisioning or update failed.
    Failed,
}

/// A load balancer as reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancer {
    /// Vendor resource identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Public DNS name, once provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
    /// Provisioning state.
    pub state: LoadBalancerState,
}

/// Network operations.
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    /// Create a VPC.
    async fn create_vpc(
        &self,
        credential: &CredentialPayload,
        spec: &VpcSpec,
    ) -> Result<Vpc, ProviderError>;

    /// Fetch a VPC by id.
    async fn get_vpc(
        &self,
        credential: &CredentialPayload,
        vpc_id: &str,
    ) -> Result<Vpc, ProviderError>;

    /// List all VPCs visible to the credential.
    async fn list_vpcs(&self, credential: &CredentialPayload) -> Result<Vec<Vpc>, ProviderError>;

    /// Delete a VPC.
    async fn delete_vpc(
        &self,
        credential: &CredentialPayload,
        vpc_id: &str,
    ) -> Result<(), ProviderError>;

    /// Create a subnet.
    async fn create_subnet(
        &self,
        credential: &CredentialPayload,
        spec: &SubnetSpec,
    ) -> Result<Subnet, ProviderError>;

    /// Fetch a subnet by id.
    async fn get_subnet(
        &self,
        credential: &CredentialPayload,
        subnet_id: &str,
    ) -> Result<Subnet, ProviderError>;

    /// List the subnets of a VPC.
    async fn list_subnets(
        &self,
        credential: &CredentialPayload,
        vpc_id: &str,
    ) -> Result<Vec<Subnet>, ProviderError>;

    /// Delete a subnet.
    async fn delete_subnet(
        &self,
        credential: &CredentialPayload,
        subnet_id: &str,
    ) -> Result<(), ProviderError>;

    /// Create a security group.
    async fn create_security_group(
        &self,
        credential: &CredentialPayload,
        spec: &SecurityGroupSpec,
    ) -> Result<SecurityGroup, ProviderError>;

    /// Fetch a security group by id.
    async fn get_security_group(
        &self,
        credential: &CredentialPayload,
        group_id: &str,
    ) -> Result<SecurityGroup, ProviderError>;

    /// List the security groups of a VPC.
    async fn list_security_groups(
        &self,
        credential: &CredentialPayload,
        vpc_id: &str,
    ) -> Result<Vec<SecurityGroup>, ProviderError>;

    /// Delete a security group.
    async fn delete_security_group(
        &self,
        credential: &CredentialPayload,
        group_id: &str,
    ) -> Result<(), ProviderError>;

    /// Authorize (add) a rule on a security group.
    async fn authorize_rule(
        &self,
        credential: &CredentialPayload,
        group_id: &str,
        rule: &SecurityGroupRule,
    ) -> Result<SecurityGroup, ProviderError>;

    /// Revoke (remove) a rule from a security group.
    async fn revoke_rule(
        &self,
        credential: &CredentialPayload,
        group_id: &str,
        rule: &SecurityGroupRule,
    ) -> Result<SecurityGroup, ProviderError>;

    /// Import an SSH public key as a key pair.
    async fn import_key_pair(
        &self,
        credential: &CredentialPayload,
        spec: &KeyPairSpec,
    ) -> Result<KeyPair, ProviderError>;

    /// List key pairs.
    async fn list_key_pairs(
        &self,
        credential: &CredentialPayload,
    ) -> Result<Vec<KeyPair>, ProviderError>;

    /// Delete a key pair by name.
    async fn delete_key_pair(
        &self,
        credential: &CredentialPayload,
        name: &str,
    ) -> Result<(), ProviderError>;

    /// Create a load balancer.
    async fn create_load_balancer(
        &self,
        credential: &CredentialPayload,
        spec: &LoadBalancerSpec,
    ) -> Result<LoadBalancer, ProviderError>;

    /// Fetch a load balancer by id.
    async fn get_load_balancer(
        &self,
        credential: &CredentialPayload,
        lb_id: &str,
    ) -> Result<LoadBalancer, ProviderError>;

    /// List load balancers.
    async fn list_load_balancers(
        &self,
        credential: &CredentialPayload,
    ) -> Result<Vec<LoadBalancer>, ProviderError>;

    /// Delete a load balancer.
    async fn delete_load_balancer(
        &self,
        credential: &CredentialPayload,
        lb_id: &str,
    ) -> Result<(), ProviderError>;
}
