//! End-to-end generation tests over Turtle Aspect Models

use oxirs_samm_json::error::ReferenceKind;
use oxirs_samm_json::parser::load_turtle_str;
use oxirs_samm_json::{
    build_model, generate_instance, generate_instance_string, generate_schema,
    generate_schema_string, generate_schema_with, Model, SammError, SchemaOptions,
};
use serde_json::{json, Value};

const PREFIXES: &str = r#"
@prefix : <urn:samm:org.eclipse.examples:1.0.0#> .
@prefix samm: <urn:samm:org.eclipse.esmf.samm:meta-model:2.3.0#> .
@prefix samm-c: <urn:samm:org.eclipse.esmf.samm:characteristic:2.3.0#> .
@prefix unit: <urn:samm:org.eclipse.esmf.samm:unit:2.3.0#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
"#;

fn load(body: &str) -> Result<Model, SammError> {
    let graph = load_turtle_str(&format!("{PREFIXES}{body}"), None)?;
    build_model(&graph)
}

fn model(body: &str) -> Model {
    load(body).expect("model should resolve")
}

fn bare_schema(model: &Model) -> Value {
    let options = SchemaOptions {
        include_schema_uri: false,
        include_metadata: false,
        ..SchemaOptions::default()
    };
    generate_schema_with(model, &options)
}

fn assert_instance_valid(model: &Model) {
    let schema = generate_schema(model);
    let instance = generate_instance(model);
    let validator = jsonschema::validator_for(&schema).expect("generated schema should compile");
    assert!(
        validator.is_valid(&instance),
        "instance {instance} does not validate against {schema}"
    );
}

const MOVEMENT: &str = r#"
:Movement a samm:Aspect ;
   samm:preferredName "movement"@en ;
   samm:description "Aspect for movement information"@en ;
   samm:properties ( :isMoving :speed ) ;
   samm:operations ( ) ;
   samm:events ( ) .

:isMoving a samm:Property ;
   samm:preferredName "is moving"@en ;
   samm:characteristic samm-c:Boolean .

:speed a samm:Property ;
   samm:preferredName "speed"@en ;
   samm:characteristic :Speed .

:Speed a samm-c:Measurement ;
   samm:dataType xsd:float ;
   samm-c:unit unit:kilometrePerHour .
"#;

#[test]
fn test_scalar_properties() {
    let movement = model(MOVEMENT);

    assert_eq!(
        bare_schema(&movement),
        json!({
            "type": "object",
            "properties": {"isMoving": {"type": "boolean"}, "speed": {"type": "number"}},
            "required": ["isMoving", "speed"]
        })
    );
    assert_eq!(
        generate_instance(&movement),
        json!({"isMoving": false, "speed": 0.0})
    );
    assert_instance_valid(&movement);
}

#[test]
fn test_scalar_properties_with_examples() {
    let body = MOVEMENT
        .replace(
            "samm:characteristic samm-c:Boolean .",
            "samm:characteristic samm-c:Boolean ; samm:exampleValue true .",
        )
        .replace(
            "samm:characteristic :Speed .",
            "samm:characteristic :Speed ; samm:exampleValue \"0.5\"^^xsd:float .",
        );
    let movement = model(&body);

    assert_eq!(
        generate_instance(&movement),
        json!({"isMoving": true, "speed": 0.5})
    );
    assert_instance_valid(&movement);
}

#[test]
fn test_schema_header_and_metadata() {
    let schema = generate_schema(&model(MOVEMENT));
    assert_eq!(schema["$schema"], json!("http://json-schema.org/draft-07/schema#"));
    assert_eq!(schema["title"], json!("movement"));
    assert_eq!(schema["description"], json!("Aspect for movement information"));
    assert_eq!(schema["properties"]["isMoving"]["title"], json!("is moving"));
}

#[test]
fn test_payload_name_and_list() {
    let part = model(
        r#"
:Part a samm:Aspect ;
   samm:properties ( [ samm:property :materialNumber ; samm:payloadName "partId" ] :coordinates ) .

:materialNumber a samm:Property ;
   samm:characteristic samm-c:Text .

:coordinates a samm:Property ;
   samm:characteristic :Coordinates .

:Coordinates a samm-c:List ;
   samm:dataType xsd:float .
"#,
    );

    let instance = generate_instance(&part);
    let object = instance.as_object().unwrap();
    let keys: Vec<&String> = object.keys().collect();
    assert_eq!(keys, vec!["partId", "coordinates"]);
    assert!(object["coordinates"].is_array());
    assert!(!object.contains_key("materialNumber"));

    let schema = bare_schema(&part);
    assert_eq!(
        schema["properties"]["coordinates"],
        json!({"type": "array", "items": {"type": "number"}})
    );
    assert_eq!(schema["required"], json!(["partId", "coordinates"]));
    assert_instance_valid(&part);
}

#[test]
fn test_either_result() {
    let result = model(
        r#"
:Response a samm:Aspect ;
   samm:properties ( :result ) .

:result a samm:Property ;
   samm:characteristic :Result .

:Result a samm-c:Either ;
   samm-c:left :ErrorCharacteristic ;
   samm-c:right :Count .

:ErrorCharacteristic a samm-c:SingleEntity ;
   samm:dataType :ErrorEntity .

:Count a samm-c:Quantifiable ;
   samm:dataType xsd:integer .

:ErrorEntity a samm:Entity ;
   samm:properties ( :errorCode :errorDescription ) .

:errorCode a samm:Property ;
   samm:characteristic samm-c:Text .

:errorDescription a samm:Property ;
   samm:characteristic samm-c:Text .
"#,
    );

    let schema = bare_schema(&result);
    assert_eq!(
        schema["properties"]["result"],
        json!({
            "oneOf": [
                {
                    "type": "object",
                    "properties": {"left": {"$ref": "#/definitions/ErrorEntity"}},
                    "required": ["left"]
                },
                {
                    "type": "object",
                    "properties": {"right": {"type": "integer"}},
                    "required": ["right"]
                }
            ]
        })
    );
    assert_eq!(
        schema["definitions"]["ErrorEntity"]["required"],
        json!(["errorCode", "errorDescription"])
    );
    assert_eq!(generate_instance(&result), json!({"result": {"right": 0}}));
    assert_instance_valid(&result);
}

#[test]
fn test_shared_entity_definition() {
    let catalog = model(
        r#"
:Catalog a samm:Aspect ;
   samm:properties ( :products :mainProduct ) .

:products a samm:Property ;
   samm:characteristic [ a samm-c:List ; samm:dataType :Product ] .

:mainProduct a samm:Property ;
   samm:characteristic [ a samm-c:SingleEntity ; samm:dataType :Product ] .

:Product a samm:Entity ;
   samm:properties ( :productName ) .

:productName a samm:Property ;
   samm:characteristic samm-c:Text ;
   samm:exampleValue "Drill" .
"#,
    );

    let schema = bare_schema(&catalog);
    let definitions = schema["definitions"].as_object().unwrap();
    assert_eq!(definitions.len(), 1);
    assert!(definitions.contains_key("Product"));
    assert_eq!(
        schema["properties"]["products"]["items"],
        json!({"$ref": "#/definitions/Product"})
    );
    assert_eq!(
        schema["properties"]["mainProduct"],
        json!({"$ref": "#/definitions/Product"})
    );

    assert_eq!(
        generate_instance(&catalog),
        json!({
            "products": [{"productName": "Drill"}],
            "mainProduct": {"productName": "Drill"}
        })
    );
    // anonymous characteristics stay inside their properties
    assert!(catalog.characteristics.keys().all(|id| !id.starts_with("_:")));
    assert_instance_valid(&catalog);
}

#[test]
fn test_self_referencing_entity() {
    let tree = model(
        r#"
:Tree a samm:Aspect ;
   samm:properties ( :root ) .

:root a samm:Property ;
   samm:characteristic :NodeCharacteristic .

:NodeCharacteristic a samm-c:SingleEntity ;
   samm:dataType :Node .

:Node a samm:Entity ;
   samm:properties ( :label :child ) .

:label a samm:Property ;
   samm:characteristic samm-c:Text .

:child a samm:Property ;
   samm:characteristic :NodeCharacteristic .
"#,
    );

    let schema = bare_schema(&tree);
    assert_eq!(schema["properties"]["root"], json!({"$ref": "#/definitions/Node"}));
    assert_eq!(
        schema["definitions"]["Node"]["properties"]["child"],
        json!({"$ref": "#/definitions/Node"})
    );
    assert_eq!(
        generate_instance(&tree),
        json!({"root": {"label": "", "child": {}}})
    );
}

#[test]
fn test_mutually_referencing_entities() {
    let org = model(
        r#"
:Organization a samm:Aspect ;
   samm:properties ( :head ) .

:head a samm:Property ;
   samm:characteristic :PersonCharacteristic .

:PersonCharacteristic a samm-c:SingleEntity ;
   samm:dataType :Person .

:DepartmentCharacteristic a samm-c:SingleEntity ;
   samm:dataType :Department .

:Person a samm:Entity ;
   samm:properties ( :name :department ) .

:Department a samm:Entity ;
   samm:properties ( :title :manager ) .

:name a samm:Property ;
   samm:characteristic samm-c:Text .

:title a samm:Property ;
   samm:characteristic samm-c:Text .

:department a samm:Property ;
   samm:characteristic :DepartmentCharacteristic .

:manager a samm:Property ;
   samm:characteristic :PersonCharacteristic .
"#,
    );

    let schema = bare_schema(&org);
    let definitions = schema["definitions"].as_object().unwrap();
    let keys: Vec<&String> = definitions.keys().collect();
    assert_eq!(keys, vec!["Person", "Department"]);
    assert_eq!(schema["properties"]["head"], json!({"$ref": "#/definitions/Person"}));
    assert_eq!(
        definitions["Person"]["properties"]["department"],
        json!({"$ref": "#/definitions/Department"})
    );
    assert_eq!(
        definitions["Department"]["properties"]["manager"],
        json!({"$ref": "#/definitions/Person"})
    );

    assert_eq!(
        generate_instance(&org),
        json!({"head": {"name": "", "department": {"title": "", "manager": {}}}})
    );
}

#[test]
fn test_sized_set_agrees_with_schema() {
    let tagged = model(
        r#"
:Tagged a samm:Aspect ;
   samm:properties ( :tags :dates ) .

:tags a samm:Property ;
   samm:characteristic [
      a samm-c:Trait ;
      samm-c:baseCharacteristic [ a samm-c:Set ; samm:dataType xsd:string ] ;
      samm-c:constraint [ a samm-c:LengthConstraint ; samm-c:minValue "2"^^xsd:nonNegativeInteger ]
   ] .

:dates a samm:Property ;
   samm:characteristic [
      a samm-c:Trait ;
      samm-c:baseCharacteristic [ a samm-c:SortedSet ; samm:dataType xsd:date ] ;
      samm-c:constraint [ a samm-c:LengthConstraint ; samm-c:minValue "3"^^xsd:nonNegativeInteger ]
   ] .
"#,
    );

    assert_eq!(
        bare_schema(&tagged)["properties"]["tags"],
        json!({"type": "array", "items": {"type": "string"}, "uniqueItems": true, "minItems": 2})
    );
    assert_eq!(
        generate_instance(&tagged),
        json!({
            "tags": ["", "1"],
            "dates": ["1970-01-01", "1971-01-01", "1972-01-01"]
        })
    );
    assert_instance_valid(&tagged);
}

#[test]
fn test_range_keeps_unsigned_minimum() {
    let counter = model(
        r#"
:Counter a samm:Aspect ;
   samm:properties ( :count ) .

:count a samm:Property ;
   samm:characteristic [
      a samm-c:Trait ;
      samm-c:baseCharacteristic [ a samm:Characteristic ; samm:dataType xsd:unsignedInt ] ;
      samm-c:constraint [
         a samm-c:RangeConstraint ;
         samm-c:minValue "-5"^^xsd:int ;
         samm-c:lowerBoundDefinition samm-c:GREATER_THAN
      ]
   ] .
"#,
    );

    let schema = generate_schema(&counter);
    let validator = jsonschema::validator_for(&schema).unwrap();
    assert!(!validator.is_valid(&json!({"count": -3})));
    assert!(validator.is_valid(&json!({"count": 3})));
    assert_instance_valid(&counter);
}

#[test]
fn test_inherited_entity_properties() {
    let fleet = model(
        r#"
:Fleet a samm:Aspect ;
   samm:properties ( :vehicle ) .

:vehicle a samm:Property ;
   samm:characteristic [ a samm-c:SingleEntity ; samm:dataType :Truck ] .

:Vehicle a samm:AbstractEntity ;
   samm:properties ( :vin :wheels ) .

:Truck a samm:Entity ;
   samm:extends :Vehicle ;
   samm:properties ( :payload [ samm:property :wheels ; samm:payloadName "axles" ] ) .

:vin a samm:Property ; samm:characteristic samm-c:Text .
:wheels a samm:Property ; samm:characteristic [ a samm:Characteristic ; samm:dataType xsd:positiveInteger ] .
:payload a samm:Property ; samm:characteristic [ a samm-c:Measurement ; samm:dataType xsd:double ; samm-c:unit unit:kilogram ] .
"#,
    );

    let schema = bare_schema(&fleet);
    let truck = &schema["definitions"]["Truck"];
    let keys: Vec<&String> = truck["properties"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["vin", "axles", "payload"]);
    assert_eq!(truck["properties"]["axles"], json!({"type": "integer", "minimum": 1}));

    assert_eq!(
        generate_instance(&fleet),
        json!({"vehicle": {"vin": "", "axles": 1, "payload": 0.0}})
    );
    assert_instance_valid(&fleet);
}

const SENSOR: &str = r#"
:Sensor a samm:Aspect ;
   samm:properties ( :status :names :tags :readings :level :lastSeen :unitOfMeasure
                     [ samm:property :note ; samm:optional true ]
                     [ samm:property :internal ; samm:notInPayload true ] ) .

:status a samm:Property ;
   samm:characteristic [ a samm-c:Enumeration ; samm:dataType xsd:string ; samm-c:values ( "ON" "OFF" ) ] .

:names a samm:Property ;
   samm:characteristic samm-c:MultiLanguageText .

:tags a samm:Property ;
   samm:characteristic [ a samm-c:Set ; samm-c:elementCharacteristic samm-c:Text ] .

:readings a samm:Property ;
   samm:characteristic :Readings .

:Readings a samm-c:Trait ;
   samm-c:baseCharacteristic [ a samm-c:List ; samm:dataType xsd:int ] ;
   samm-c:constraint [ a samm-c:LengthConstraint ; samm-c:minValue "2"^^xsd:nonNegativeInteger ] .

:level a samm:Property ;
   samm:characteristic :Level .

:Level a samm-c:Trait ;
   samm-c:baseCharacteristic [ a samm:Characteristic ; samm:dataType xsd:int ] ;
   samm-c:constraint [ a samm-c:RangeConstraint ; samm-c:minValue "5"^^xsd:int ; samm-c:maxValue "10"^^xsd:int ] .

:lastSeen a samm:Property ;
   samm:characteristic samm-c:Timestamp .

:unitOfMeasure a samm:Property ;
   samm:characteristic samm-c:UnitReference .

:note a samm:Property ;
   samm:characteristic samm-c:Text .

:internal a samm:Property ;
   samm:characteristic samm-c:Text .
"#;

#[test]
fn test_mixed_characteristics() {
    let sensor = model(SENSOR);
    let schema = bare_schema(&sensor);

    assert_eq!(
        schema["properties"]["status"],
        json!({"type": "string", "enum": ["ON", "OFF"]})
    );
    assert_eq!(
        schema["properties"]["names"],
        json!({"type": "object", "additionalProperties": {"type": "string"}})
    );
    assert_eq!(
        schema["properties"]["tags"],
        json!({"type": "array", "items": {"type": "string"}, "uniqueItems": true})
    );
    assert_eq!(
        schema["properties"]["readings"],
        json!({"type": "array", "items": {"type": "integer"}, "minItems": 2})
    );
    assert_eq!(
        schema["properties"]["level"],
        json!({"type": "integer", "minimum": 5, "maximum": 10})
    );
    assert_eq!(
        schema["properties"]["lastSeen"],
        json!({"type": "string", "format": "date-time"})
    );
    assert!(schema["properties"].get("internal").is_none());
    assert!(!schema["required"].as_array().unwrap().contains(&json!("note")));

    assert_eq!(
        generate_instance(&sensor),
        json!({
            "status": "ON",
            "names": {"en": ""},
            "tags": [""],
            "readings": [0, 0],
            "level": 5,
            "lastSeen": "1970-01-01T00:00:00Z",
            "unitOfMeasure": "unit:one"
        })
    );
    assert_instance_valid(&sensor);
}

#[test]
fn test_unknown_characteristic_kind_is_diagnosed() {
    let fancy = model(
        r#"
:Fancy a samm:Aspect ;
   samm:properties ( :shape ) .

:shape a samm:Property ;
   samm:characteristic [ a samm-c:Hologram ; samm:dataType xsd:string ] .
"#,
    );
    assert_eq!(fancy.diagnostics.len(), 1);
    assert_eq!(bare_schema(&fancy)["properties"]["shape"], json!({"type": "object"}));
    assert_eq!(generate_instance(&fancy), json!({"shape": {}}));
}

#[test]
fn test_generation_is_deterministic() {
    let first = model(SENSOR);
    let second = model(SENSOR);

    assert_eq!(
        generate_schema_string(&first).unwrap(),
        generate_schema_string(&second).unwrap()
    );
    assert_eq!(
        generate_instance_string(&first).unwrap(),
        generate_instance_string(&second).unwrap()
    );
}

#[test]
fn test_resolution_errors() {
    assert!(matches!(
        load(":speed a samm:Property ; samm:characteristic samm-c:Text ."),
        Err(SammError::MissingAspect)
    ));

    match load(":A a samm:Aspect ; samm:properties ( :p ) .\n:p a samm:Property ; samm:characteristic :Undefined .") {
        Err(SammError::UnresolvedReference { kind, id, .. }) => {
            assert_eq!(kind, ReferenceKind::Characteristic);
            assert_eq!(id, "urn:samm:org.eclipse.examples:1.0.0#Undefined");
        }
        other => panic!("unexpected result {other:?}"),
    }

    assert!(matches!(
        load(":A a samm:Aspect ; samm:properties ( :p ) .\n:p a samm:Property ; samm:characteristic [ a samm-c:Either ; samm-c:right samm-c:Text ] ."),
        Err(SammError::IncompleteEither { missing: "left", .. })
    ));

    assert!(matches!(
        load(":A a samm:Aspect ; samm:properties ( :p ) .\n:p a samm:Property ; samm:characteristic [ a samm-c:List ] ."),
        Err(SammError::MissingCollectionElementType { .. })
    ));
}

#[test]
fn test_malformed_property_list() {
    let err = load(
        r#"
:A a samm:Aspect ; samm:properties _:cell .
_:cell <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> :p ;
       <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> _:cell .
:p a samm:Property ; samm:characteristic samm-c:Text .
"#,
    )
    .unwrap_err();
    assert!(matches!(err, SammError::MalformedList { .. }));
}

#[test]
fn test_syntax_error_has_location() {
    let err = load_turtle_str(":A a samm:Aspect", None).unwrap_err();
    assert!(matches!(err, SammError::ParseErrorWithLocation { .. }));
}
