//! Fixed text templates for signature and notary blocks, keyed by owner
//! type through the `OwnerType` enum instead of loose template files.
//!
//! Each signature template carries a `[Notary Block]` marker where the
//! acknowledgment is spliced when notary embedding is requested.

/// Single individual signer.
pub const INDIVIDUAL_SIGNATURE: &str = "\
GRANTOR:

_______________________________
[Grantor Name]

Date: _______________________

[Notary Block]";

/// Spousal consent line used for the second signer of a sole-owner married
/// couple.
pub const SPOUSAL_CONSENT_SIGNATURE: &str = "\
CONSENT OF SPOUSE:

The undersigned, spouse of the Grantor, consents to this instrument and to
the disposition of the property described herein.

_______________________________
[Grantor Name], Spouse

Date: _______________________

[Notary Block]";

/// Entity signer (corporation, LLC, LP, trust).
pub const ENTITY_SIGNATURE: &str = "\
GRANTOR:

[Trust/Entity Name]

By: ___________________________
Name: [Name]
Title: [Title]

Date: _______________________

[Notary Block]";

/// All-purpose acknowledgment for individual signers.
pub const INDIVIDUAL_NOTARY: &str = "\
STATE OF [State] SS:

COUNTY OF [County]

On _______________________, before me, __________________________________,
Notary Public, personally appeared [NAME(S) OF INDIVIDUAL(S)], who proved
to me on the basis of satisfactory evidence to be the person(s) whose
name(s) is/are subscribed to the within instrument and acknowledged to me
that he/she/they executed the same in his/her/their authorized
capacity(ies).

[STAMP]\t\t________________________________

Title of Office: Notary Public

Printed Name: ____________________

My Commission Expires: ___________";

/// Acknowledgment for authorized signatories of an entity or trust.
pub const ENTITY_NOTARY: &str = "\
STATE OF [State] SS:

COUNTY OF [County]

On _______________________, before me, __________________________________,
Notary Public, personally appeared [NAME(S) OF INDIVIDUAL(S)], who proved
to me on the basis of satisfactory evidence to be the person(s) whose
name(s) is/are subscribed to the within instrument and acknowledged to me
that he/she/they executed the same as [TYPE OF AUTHORITY] on behalf of
[NAME OF ENTITY OR TRUST WHOM INSTRUMENT WAS EXECUTED FOR].

[STAMP]\t\t________________________________

Title of Office: Notary Public

Printed Name: ____________________

My Commission Expires: ___________";
