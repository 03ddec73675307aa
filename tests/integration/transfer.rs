// tests/integration/transfer.rs

use accstorage::mutation::ImportRequest;
use accstorage::transfer::{ExportMode, ImportReport};
use accstorage::VaultError;

use crate::common::{fixture, CODE, ROOT_PASSWORD};

fn request(csv: &str, code: &str, already_encrypted: bool) -> ImportRequest {
    ImportRequest {
        csv: Some(csv.to_string()),
        code: code.to_string(),
        already_encrypted,
    }
}

#[tokio::test]
async fn organization_import_skips_duplicates_within_the_file() {
    let fx = fixture().await;
    let csv = "id,nom,adresse,telephone,couleur,createdAt,updatedAt\n\
               ,Acme,1 rue,0102,#ff0000,,\n\
               ,Globex,2 rue,0304,,,\n\
               ,Acme,3 rue,0506,,,\n";

    let report = fx
        .service
        .pipeline()
        .import_organizations(Some(&fx.session), request(csv, CODE, false))
        .await
        .unwrap();

    assert_eq!(report, ImportReport { added: 2, skipped: 1, errors: 0 });
    assert_eq!(report.message(), "Import finished: 2 added, 1 skipped, 0 errors");
    assert_eq!(fx.store.list_organizations().await.unwrap().len(), 2);
}

#[tokio::test]
async fn organization_import_skips_a_name_already_stored() {
    let fx = fixture().await;
    fx.organization("Globex").await;
    let csv = "nom,adresse,telephone\n\
               Acme,1 rue,0102\n\
               Globex,2 rue,0304\n\
               Initech,3 rue,0506\n";

    let report = fx
        .service
        .pipeline()
        .import_organizations(Some(&fx.session), request(csv, CODE, false))
        .await
        .unwrap();

    assert_eq!(report, ImportReport { added: 2, skipped: 1, errors: 0 });
    let globex = fx.store.find_organization_by_name("Globex").await.unwrap().unwrap();
    assert_eq!(globex.address, "1 rue de la Paix");
    assert_eq!(fx.store.list_organizations().await.unwrap().len(), 3);
}

#[tokio::test]
async fn import_checks_the_code_once_and_writes_nothing_when_rejected() {
    let fx = fixture().await;
    let org = fx.organization("Acme").await;
    let csv = "nom,prenom,typeInfo,identifiant,motDePasse\nDurand,Anne,wifi,anne,pw\n";

    let err = fx
        .service
        .pipeline()
        .import_records(Some(&fx.session), org.id, request(csv, "999999", false))
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::TwoFactor));
    assert_eq!(fx.store.count_records(org.id).await.unwrap(), 0);
}

#[tokio::test]
async fn import_without_a_file_is_a_validation_error() {
    let fx = fixture().await;
    let org = fx.organization("Acme").await;

    let err = fx
        .service
        .pipeline()
        .import_records(
            Some(&fx.session),
            org.id,
            ImportRequest {
                csv: None,
                code: CODE.into(),
                already_encrypted: false,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::Validation(_)));
}

#[tokio::test]
async fn imported_records_pass_through_or_get_encrypted() {
    let fx = fixture().await;
    let org = fx.organization("Acme").await;
    let sealed = fx.cipher.encrypt("secret");

    let plain = "nom,prenom,typeInfo,identifiant,motDePasse\nDurand,Anne,wifi,anne,secret\n";
    let encrypted = format!(
        "nom,prenom,typeInfo,identifiant,motDePasse\n{},{},wifi,{},{}\n",
        fx.cipher.encrypt("Martin"),
        fx.cipher.encrypt("Paul"),
        fx.cipher.encrypt("paul"),
        sealed
    );

    let first = fx
        .service
        .pipeline()
        .import_records(Some(&fx.session), org.id, request(plain, CODE, false))
        .await
        .unwrap();
    let second = fx
        .service
        .pipeline()
        .import_records(Some(&fx.session), org.id, request(&encrypted, CODE, true))
        .await
        .unwrap();

    assert_eq!(first.added, 1);
    assert_eq!(second.added, 1);
    let stored = fx.store.list_records(org.id).await.unwrap();
    assert_eq!(stored[0].password, sealed);
    assert_eq!(stored[1].password, sealed);

    let listed = fx.service.list_records(Some(&fx.session), org.id).await.unwrap();
    assert_eq!(listed[0].last_name, "Durand");
    assert_eq!(listed[1].last_name, "Martin");
}

#[tokio::test]
async fn clear_export_with_a_wrong_password_is_an_auth_error() {
    let fx = fixture().await;
    let org = fx.organization("Acme").await;
    fx.record(&org, "Durand", "pw").await;

    let err = fx
        .service
        .export_records(Some(&fx.session), org.id, ExportMode::Clear, Some("not-the-password"))
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::Auth(_)));
}

#[tokio::test]
async fn clear_export_round_trips_plaintext() {
    let fx = fixture().await;
    let org = fx.organization("Acme").await;
    fx.record(&org, "Durand", "hunter2").await;

    let csv = fx
        .service
        .export_records(Some(&fx.session), org.id, ExportMode::Clear, Some(ROOT_PASSWORD))
        .await
        .unwrap();

    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,nom,prenom,entrepriseId,typeInfo,identifiant,motDePasse,createdAt,updatedAt")
    );
    let row = lines.next().unwrap();
    assert!(row.contains(",Durand,Jean,"));
    assert!(row.contains(",durand-login,hunter2,"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn exported_ciphertext_imports_back_unchanged() {
    let fx = fixture().await;
    let source = fx.organization("Acme").await;
    let target = fx.organization("Globex").await;
    fx.record(&source, "Durand", "pw-1").await;
    fx.record(&source, "Petit", "pw-2").await;

    let csv = fx
        .service
        .export_records(Some(&fx.session), source.id, ExportMode::Encrypted, None)
        .await
        .unwrap();
    let report = fx
        .service
        .pipeline()
        .import_records(Some(&fx.session), target.id, request(&csv, CODE, true))
        .await
        .unwrap();

    assert_eq!(report, ImportReport { added: 2, skipped: 0, errors: 0 });
    let copied = fx.store.list_records(target.id).await.unwrap();
    let originals = fx.store.list_records(source.id).await.unwrap();
    assert_eq!(copied[0].password, originals[0].password);
    assert_eq!(copied[1].login, originals[1].login);
    assert_eq!(copied[0].organization_id, target.id);
}

#[tokio::test]
async fn sub_admins_cannot_export() {
    let fx = fixture().await;
    let org = fx.organization("Acme").await;
    let (_, session) = fx.sub_admin("helper").await;

    let err = fx
        .service
        .export_records(Some(&session), org.id, ExportMode::Encrypted, None)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::Forbidden(_)));

    let err = fx.service.export_organizations(Some(&session)).await.unwrap_err();
    assert!(matches!(err, VaultError::Forbidden(_)));
}
