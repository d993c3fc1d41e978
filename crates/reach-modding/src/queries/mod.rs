pub mod crmm;
